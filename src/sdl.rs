//! SDL2 window surface.
//!
//! Draws the two photo layers with their sampled animation poses, a progress
//! bar and a controls strip, and turns SDL events into [`UserInput`]s.
//! Text (clock, counter, status, caption, key help) goes to the window title.

use crate::cache::ImageHandle;
use crate::effects::{Animation, Axis, Pose};
use crate::input::{Key, UserInput, HELP};
use crate::render::{AudioIndicator, ProgressBar, RenderSurface, Role, SurfaceId};
use anyhow::{Context, Result};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::{Color, PixelFormatEnum};
use sdl2::rect::Rect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{FullscreenType, Window, WindowContext};
use sdl2::EventPump;
use std::time::Duration;
use tokio::time::Instant;

const FRAME: Duration = Duration::from_millis(16);
/// Share of the window height, from the bottom, that counts as the controls.
const CONTROLS_SHARE: f32 = 0.12;

struct Playing {
    animation: Animation,
    started: Instant,
    duration: Duration,
}

struct Layer {
    texture: Option<Texture>,
    size: (u32, u32),
    role: Role,
    playing: Option<Playing>,
}

impl Layer {
    fn new(role: Role) -> Self {
        Self {
            texture: None,
            size: (0, 0),
            role,
            playing: None,
        }
    }

    /// The staging layer is drawn only while it animates.
    fn visible(&self) -> bool {
        self.role == Role::Current || self.playing.is_some()
    }

    fn pose(&self, now: Instant) -> Pose {
        match &self.playing {
            Some(p) if !p.duration.is_zero() => {
                let t = now.saturating_duration_since(p.started).as_secs_f32()
                    / p.duration.as_secs_f32();
                p.animation.sample(t)
            }
            Some(p) => p.animation.final_pose(),
            None => Pose::IDENTITY,
        }
    }
}

#[derive(Default)]
struct Overlay {
    counter: (usize, usize),
    status: String,
    caption: String,
    progress: Option<(Instant, Duration)>,
    controls_visible: bool,
    audio: Option<AudioIndicator>,
    no_content: bool,
    clock: String,
    help_visible: bool,
}

pub struct SdlSurface {
    canvas: Canvas<Window>,
    creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    screen: (u32, u32),
    layers: [Layer; 2],
    overlay: Overlay,
    over_controls: bool,
}

impl SdlSurface {
    /// Initialize SDL2 and open a window the size of the desktop.
    pub fn new() -> Result<Self> {
        let sdl_context = sdl2::init().map_err(|e| anyhow::anyhow!("SDL init failed: {}", e))?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|e| anyhow::anyhow!("SDL video init failed: {}", e))?;

        let display_mode = video_subsystem
            .desktop_display_mode(0)
            .map_err(|e| anyhow::anyhow!("Failed to get display mode: {}", e))?;
        let screen = (display_mode.w as u32, display_mode.h as u32);
        tracing::info!("Creating window: {}x{}", screen.0, screen.1);

        let window = video_subsystem
            .window("Photo Wall", screen.0, screen.1)
            .resizable()
            .build()
            .context("Failed to create window")?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .context("Failed to create canvas")?;
        canvas.set_blend_mode(BlendMode::Blend);
        canvas.set_draw_color(Color::RGB(0, 0, 0));
        canvas.clear();
        canvas.present();

        let event_pump = sdl_context
            .event_pump()
            .map_err(|e| anyhow::anyhow!("Failed to get event pump: {}", e))?;
        let creator = canvas.texture_creator();

        Ok(Self {
            canvas,
            creator,
            event_pump,
            screen,
            layers: [Layer::new(Role::Current), Layer::new(Role::Next)],
            overlay: Overlay {
                controls_visible: true,
                ..Overlay::default()
            },
            over_controls: false,
        })
    }

    fn texture_from(&self, image: &ImageHandle) -> Result<Texture> {
        let (width, height) = image.dimensions();
        let pixels = image.pixels().as_raw();
        let mut texture = self
            .creator
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .context("Failed to create texture")?;

        texture
            .with_lock(None, |buffer: &mut [u8], pitch: usize| {
                let row_bytes = width as usize * 4;
                for y in 0..height as usize {
                    let src = y * row_bytes;
                    let dst = y * pitch;
                    buffer[dst..dst + row_bytes].copy_from_slice(&pixels[src..src + row_bytes]);
                }
            })
            .map_err(|e| anyhow::anyhow!("Failed to update texture: {}", e))?;
        texture.set_blend_mode(BlendMode::Blend);
        Ok(texture)
    }

    fn refresh_title(&mut self) {
        let o = &self.overlay;
        let title = if o.help_visible {
            HELP.iter()
                .map(|(keys, action)| format!("{}: {}", keys, action))
                .collect::<Vec<_>>()
                .join(" | ")
        } else if o.no_content {
            "Photo Wall - no photos found, press D for demo content".to_string()
        } else {
            let muted = match o.audio {
                Some(a) if a.muted => " [muted]",
                _ => "",
            };
            format!(
                "{} ({}/{}) - {}{}  {}",
                o.caption, o.counter.0, o.counter.1, o.status, muted, o.clock
            )
        };
        if let Err(e) = self.canvas.window_mut().set_title(&title) {
            tracing::debug!("Failed to set window title: {}", e);
        }
    }

    fn draw(&mut self, now: Instant) -> Result<()> {
        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        self.canvas.clear();

        // staging layer underneath, current on top
        for role in [Role::Next, Role::Current] {
            for layer in self
                .layers
                .iter_mut()
                .filter(|l| l.role == role && l.visible())
            {
                draw_layer(&mut self.canvas, self.screen, layer, now)?;
            }
        }

        if self.overlay.controls_visible {
            let (w, h) = self.screen;
            let strip = (h as f32 * CONTROLS_SHARE) as u32;
            self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 110));
            self.canvas
                .fill_rect(Rect::new(0, (h - strip) as i32, w, strip))
                .map_err(|e| anyhow::anyhow!("Failed to draw controls: {}", e))?;
        }

        if self.overlay.help_visible {
            let (w, h) = self.screen;
            self.canvas.set_draw_color(Color::RGBA(0, 0, 0, 160));
            self.canvas
                .fill_rect(Rect::new(0, 0, w, h))
                .map_err(|e| anyhow::anyhow!("Failed to draw help backdrop: {}", e))?;
        }

        if let Some((started, interval)) = self.overlay.progress {
            let share = if interval.is_zero() {
                1.0
            } else {
                (now.saturating_duration_since(started).as_secs_f32() / interval.as_secs_f32())
                    .min(1.0)
            };
            let (w, h) = self.screen;
            let filled = (w as f32 * share) as u32;
            if filled > 0 {
                self.canvas.set_draw_color(Color::RGBA(77, 171, 247, 220));
                self.canvas
                    .fill_rect(Rect::new(0, h as i32 - 4, filled, 4))
                    .map_err(|e| anyhow::anyhow!("Failed to draw progress: {}", e))?;
            }
        }

        self.canvas.present();
        Ok(())
    }

    fn map_event(&mut self, event: Event, out: &mut Vec<UserInput>) {
        match event {
            Event::Quit { .. } => out.push(UserInput::Quit),
            Event::KeyDown {
                keycode: Some(keycode),
                repeat: false,
                ..
            } => {
                let key = match keycode {
                    Keycode::Space => Key::Space,
                    Keycode::Left => Key::ArrowLeft,
                    Keycode::Right => Key::ArrowRight,
                    Keycode::F11 => Key::F11,
                    Keycode::Escape => Key::Escape,
                    Keycode::Q => {
                        out.push(UserInput::Quit);
                        return;
                    }
                    other => match other.name().chars().next() {
                        Some(c) if other.name().len() == 1 => Key::Char(c.to_ascii_lowercase()),
                        _ => return,
                    },
                };
                out.push(UserInput::Key(key));
            }
            Event::MouseMotion { y, .. } => {
                out.push(UserInput::PointerMoved);
                let threshold = self.screen.1 as f32 * (1.0 - CONTROLS_SHARE);
                let over = self.overlay.controls_visible && y as f32 >= threshold;
                if over != self.over_controls {
                    self.over_controls = over;
                    out.push(if over {
                        UserInput::PointerEnteredControls
                    } else {
                        UserInput::PointerLeftControls
                    });
                }
            }
            Event::MouseButtonDown { .. } => out.push(UserInput::Click),
            Event::Window { win_event, .. } => match win_event {
                WindowEvent::Enter => out.push(UserInput::PointerEnteredWindow),
                WindowEvent::Leave => {
                    self.over_controls = false;
                    out.push(UserInput::PointerLeftWindow);
                }
                WindowEvent::SizeChanged(w, h) => {
                    self.screen = (w.max(1) as u32, h.max(1) as u32);
                }
                _ => {}
            },
            _ => {}
        }
    }
}

/// Aspect-fit rectangle for an image inside the screen.
fn aspect_fit(screen: (u32, u32), image: (u32, u32)) -> (f32, f32, f32, f32) {
    let (sw, sh) = (screen.0 as f32, screen.1 as f32);
    let ratio = image.0 as f32 / image.1.max(1) as f32;
    let (w, h) = if ratio > sw / sh {
        (sw, sw / ratio)
    } else {
        (sh * ratio, sh)
    };
    ((sw - w) / 2.0, (sh - h) / 2.0, w, h)
}

fn draw_layer(
    canvas: &mut Canvas<Window>,
    screen: (u32, u32),
    layer: &mut Layer,
    now: Instant,
) -> Result<()> {
    let pose = layer.pose(now);
    let size = layer.size;
    let Some(texture) = layer.texture.as_mut() else {
        return Ok(());
    };
    if pose.opacity <= 0.0 || size.0 == 0 {
        return Ok(());
    }

    let (x, y, w, h) = aspect_fit(screen, size);
    // rotation around X or Y reads as a horizontal or vertical squash
    let turn = pose.rotate_deg.to_radians().cos().abs();
    let (sx, sy) = match pose.axis {
        Axis::X => (pose.scale_x, pose.scale_y * turn),
        Axis::Y => (pose.scale_x * turn, pose.scale_y),
        Axis::Z => (pose.scale_x, pose.scale_y),
    };
    let (dw, dh) = (w * sx, h * sy);
    let dx = x + (w - dw) / 2.0 + pose.translate_x * screen.0 as f32;
    let dy = y + (h - dh) / 2.0 + pose.translate_y * screen.1 as f32;
    if dw < 1.0 || dh < 1.0 {
        return Ok(());
    }

    let level = (255.0 * pose.brightness.clamp(0.0, 1.0)) as u8;
    texture.set_color_mod(level, level, level);
    texture.set_alpha_mod((pose.opacity.clamp(0.0, 1.0) * 255.0) as u8);

    let dest = Rect::new(dx as i32, dy as i32, dw as u32, dh as u32);
    let angle = if pose.axis == Axis::Z {
        pose.rotate_deg as f64
    } else {
        0.0
    };
    canvas
        .copy_ex(texture, None, dest, angle, None, false, false)
        .map_err(|e| anyhow::anyhow!("Failed to draw photo: {}", e))
}

impl RenderSurface for SdlSurface {
    fn set_image(&mut self, surface: SurfaceId, image: &ImageHandle) {
        match self.texture_from(image) {
            Ok(texture) => {
                let layer = &mut self.layers[surface.index()];
                if let Some(old) = layer.texture.replace(texture) {
                    // SAFETY: the canvas that created the texture is still alive.
                    unsafe { old.destroy() };
                }
                layer.size = image.dimensions();
            }
            Err(e) => tracing::warn!("Cannot upload {}: {:#}", image.reference(), e),
        }
    }

    fn animate(&mut self, surface: SurfaceId, animation: &Animation, duration: Duration) {
        self.layers[surface.index()].playing = Some(Playing {
            animation: *animation,
            started: Instant::now(),
            duration,
        });
    }

    fn reset(&mut self, surface: SurfaceId) {
        self.layers[surface.index()].playing = None;
    }

    fn set_role(&mut self, surface: SurfaceId, role: Role) {
        self.layers[surface.index()].role = role;
    }

    fn set_counter(&mut self, position: usize, total: usize) {
        self.overlay.counter = (position, total);
        self.refresh_title();
    }

    fn set_status(&mut self, status: &str) {
        self.overlay.status = status.to_string();
        self.refresh_title();
    }

    fn set_caption(&mut self, caption: &str) {
        self.overlay.caption = caption.to_string();
        self.refresh_title();
    }

    fn set_progress(&mut self, progress: ProgressBar) {
        self.overlay.progress = match progress {
            ProgressBar::Empty => None,
            ProgressBar::Filling(interval) => Some((Instant::now(), interval)),
        };
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.overlay.controls_visible = visible;
        self.canvas.window().subsystem().sdl().mouse().show_cursor(visible);
    }

    fn set_audio_indicator(&mut self, indicator: AudioIndicator) {
        self.overlay.audio = Some(indicator);
        self.refresh_title();
    }

    fn show_no_content(&mut self) {
        self.overlay.no_content = true;
        self.refresh_title();
    }

    fn hide_no_content(&mut self) {
        self.overlay.no_content = false;
        self.refresh_title();
    }

    fn set_clock(&mut self, text: &str) {
        if self.overlay.clock != text {
            self.overlay.clock = text.to_string();
            self.refresh_title();
        }
    }

    fn set_help_visible(&mut self, visible: bool) {
        self.overlay.help_visible = visible;
        self.refresh_title();
    }

    fn request_fullscreen(&mut self, fullscreen: bool) -> bool {
        let mode = if fullscreen {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        match self.canvas.window_mut().set_fullscreen(mode) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Full-screen request failed: {}", e);
                false
            }
        }
    }

    fn frame_interval(&self) -> Option<Duration> {
        Some(FRAME)
    }

    fn present(&mut self, now: Instant) {
        if let Err(e) = self.draw(now) {
            tracing::warn!("Frame dropped: {:#}", e);
        }
    }

    fn poll_input(&mut self) -> Vec<UserInput> {
        let events: Vec<Event> = self.event_pump.poll_iter().collect();
        let mut out = Vec::new();
        for event in events {
            self.map_event(event, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_staging_layer_is_hidden() {
        let mut staging = Layer::new(Role::Next);
        assert!(!staging.visible());
        assert!(Layer::new(Role::Current).visible());

        let variant = crate::effects::Effect::Fade.record().variants[0];
        staging.playing = Some(Playing {
            animation: variant.enter,
            started: Instant::now(),
            duration: Duration::from_millis(500),
        });
        assert!(staging.visible());
    }

    #[test]
    fn aspect_fit_letterboxes_wide_images() {
        let (x, y, w, h) = aspect_fit((1920, 1080), (2000, 500));
        assert_eq!((x, w), (0.0, 1920.0));
        assert_eq!(h, 480.0);
        assert_eq!(y, 300.0);
    }

    #[test]
    fn aspect_fit_pillarboxes_tall_images() {
        let (x, y, w, h) = aspect_fit((1920, 1080), (540, 1080));
        assert_eq!((y, h), (0.0, 1080.0));
        assert_eq!(w, 540.0);
        assert_eq!(x, 690.0);
    }
}
