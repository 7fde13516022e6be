//! Render surface contract.
//!
//! The engine never draws. It tells a [`RenderSurface`] which image each of
//! the two photo surfaces holds, which animation they run, and what the
//! overlay (counter, status, caption, progress, controls) should show.

use crate::cache::ImageHandle;
use crate::effects::Animation;
use std::time::Duration;
use tokio::time::Instant;

/// One of the two stacked photo surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    A,
    B,
}

impl SurfaceId {
    pub fn other(self) -> SurfaceId {
        match self {
            SurfaceId::A => SurfaceId::B,
            SurfaceId::B => SurfaceId::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SurfaceId::A => 0,
            SurfaceId::B => 1,
        }
    }
}

/// Which role a surface currently plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// On top, showing the displayed photo.
    Current,
    /// Underneath, staging the incoming photo.
    Next,
}

/// State of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBar {
    /// Empty, no animation.
    Empty,
    /// Fill linearly from empty to full over the given duration.
    Filling(Duration),
}

/// What the music indicator should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioIndicator {
    pub sounding: bool,
    pub muted: bool,
    pub volume: f32,
}

pub trait RenderSurface {
    /// Set the image a surface displays.
    fn set_image(&mut self, surface: SurfaceId, image: &ImageHandle);

    /// Start `animation` on `surface`, running for `duration`.
    fn animate(&mut self, surface: SurfaceId, animation: &Animation, duration: Duration);

    /// Drop any animation and return the surface to its neutral pose.
    fn reset(&mut self, surface: SurfaceId);

    fn set_role(&mut self, surface: SurfaceId, role: Role);

    /// Counter text, `position` is 1-based.
    fn set_counter(&mut self, position: usize, total: usize);

    fn set_status(&mut self, status: &str);

    fn set_caption(&mut self, caption: &str);

    fn set_progress(&mut self, progress: ProgressBar);

    fn set_controls_visible(&mut self, visible: bool);

    fn set_audio_indicator(&mut self, indicator: AudioIndicator);

    /// Persistent "nothing to show" affordance for an empty deck. It offers
    /// the demo deck.
    fn show_no_content(&mut self);

    /// Remove the no-content affordance once a deck has been loaded.
    fn hide_no_content(&mut self);

    /// Wall clock text.
    fn set_clock(&mut self, text: &str);

    /// Show or hide the key binding overlay ([`crate::input::HELP`]).
    fn set_help_visible(&mut self, visible: bool);

    /// Ask the surface to enter or leave full-screen. Returns true if the
    /// change took effect synchronously; otherwise the surface reports it
    /// later as an input event.
    fn request_fullscreen(&mut self, fullscreen: bool) -> bool;

    /// How often [`RenderSurface::present`] wants to be called. `None` for
    /// surfaces that do not draw frames.
    fn frame_interval(&self) -> Option<Duration> {
        None
    }

    /// Draw one frame.
    fn present(&mut self, _now: Instant) {}

    /// Drain input events the surface collected since the last call.
    fn poll_input(&mut self) -> Vec<crate::input::UserInput> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
struct SurfaceSlot {
    reference: Option<String>,
    role: Role,
    animation: Option<&'static str>,
}

/// Surface that keeps the overlay state in memory and logs changes.
/// Used when no window backend is compiled in.
#[derive(Debug)]
pub struct HeadlessSurface {
    slots: [SurfaceSlot; 2],
    counter: (usize, usize),
    status: String,
    caption: String,
    progress: ProgressBar,
    controls_visible: bool,
    fullscreen: bool,
    clock: String,
    help_visible: bool,
    no_content: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            slots: [
                SurfaceSlot {
                    reference: None,
                    role: Role::Current,
                    animation: None,
                },
                SurfaceSlot {
                    reference: None,
                    role: Role::Next,
                    animation: None,
                },
            ],
            counter: (0, 0),
            status: String::new(),
            caption: String::new(),
            progress: ProgressBar::Empty,
            controls_visible: true,
            fullscreen: false,
            clock: String::new(),
            help_visible: false,
            no_content: false,
        }
    }

    /// Reference shown by the surface in the current role.
    pub fn displayed(&self) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.role == Role::Current)
            .and_then(|s| s.reference.as_deref())
    }

    pub fn counter(&self) -> (usize, usize) {
        self.counter
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn progress(&self) -> ProgressBar {
        self.progress
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn clock(&self) -> &str {
        &self.clock
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn no_content(&self) -> bool {
        self.no_content
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_image(&mut self, surface: SurfaceId, image: &ImageHandle) {
        tracing::debug!(?surface, reference = %image.reference(), "surface image");
        self.slots[surface.index()].reference = Some(image.reference().to_string());
    }

    fn animate(&mut self, surface: SurfaceId, animation: &Animation, duration: Duration) {
        tracing::debug!(?surface, animation = animation.name, ?duration, "surface animation");
        self.slots[surface.index()].animation = Some(animation.name);
    }

    fn reset(&mut self, surface: SurfaceId) {
        self.slots[surface.index()].animation = None;
    }

    fn set_role(&mut self, surface: SurfaceId, role: Role) {
        self.slots[surface.index()].role = role;
    }

    fn set_counter(&mut self, position: usize, total: usize) {
        self.counter = (position, total);
    }

    fn set_status(&mut self, status: &str) {
        tracing::info!("Status: {}", status);
        self.status = status.to_string();
    }

    fn set_caption(&mut self, caption: &str) {
        tracing::info!("Showing {} ({}/{})", caption, self.counter.0, self.counter.1);
        self.caption = caption.to_string();
    }

    fn set_progress(&mut self, progress: ProgressBar) {
        self.progress = progress;
    }

    fn set_controls_visible(&mut self, visible: bool) {
        tracing::debug!(visible, "controls");
        self.controls_visible = visible;
    }

    fn set_audio_indicator(&mut self, indicator: AudioIndicator) {
        tracing::debug!(?indicator, "music indicator");
    }

    fn show_no_content(&mut self) {
        tracing::warn!("No photos found, nothing to show (press D for demo content)");
        self.no_content = true;
    }

    fn hide_no_content(&mut self) {
        self.no_content = false;
    }

    fn set_clock(&mut self, text: &str) {
        tracing::trace!(clock = text);
        self.clock = text.to_string();
    }

    fn set_help_visible(&mut self, visible: bool) {
        if visible && !self.help_visible {
            for (keys, action) in crate::input::HELP {
                tracing::info!("{:>14}  {}", keys, action);
            }
        }
        self.help_visible = visible;
    }

    fn request_fullscreen(&mut self, fullscreen: bool) -> bool {
        self.fullscreen = fullscreen;
        true
    }
}
