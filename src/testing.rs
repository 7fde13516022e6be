//! In-crate fakes for the collaborators the engine talks to.

use crate::audio::AudioSink;
use crate::cache::{ImageHandle, ImageLoader};
use crate::effects::Animation;
use crate::error::{MediaError, SinkError};
use crate::notify::{Notification, Notifier, Severity};
use crate::render::{AudioIndicator, ProgressBar, RenderSurface, Role, SurfaceId};
use futures_util::future::BoxFuture;
use image::{Rgba, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Image(SurfaceId, String),
    Animate(SurfaceId, &'static str, Duration),
    Reset(SurfaceId),
    Role(SurfaceId, Role),
    Counter(usize, usize),
    Status(String),
    Caption(String),
    Progress(ProgressBar),
    Controls(bool),
    Audio(AudioIndicator),
    NoContent,
    ContentRestored,
    Clock(String),
    Help(bool),
    Fullscreen(bool),
}

#[derive(Debug)]
struct SurfaceLog {
    calls: Vec<(Instant, SurfaceCall)>,
    images: [Option<String>; 2],
    roles: [Role; 2],
}

/// Render surface that records every call with the (tokio) time it was made.
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            log: Arc::new(Mutex::new(SurfaceLog {
                calls: Vec::new(),
                images: [None, None],
                roles: [Role::Current, Role::Next],
            })),
        }
    }
}

impl RecordingSurface {
    fn push(&self, call: SurfaceCall) {
        self.log.lock().unwrap().calls.push((Instant::now(), call));
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.log.lock().unwrap().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    /// Reference on the surface currently holding the `Current` role.
    pub fn displayed(&self) -> Option<String> {
        let log = self.log.lock().unwrap();
        let i = log.roles.iter().position(|r| *r == Role::Current)?;
        log.images[i].clone()
    }

    pub fn current_roles(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .roles
            .iter()
            .filter(|r| **r == Role::Current)
            .count()
    }

    /// Captions in the order they were shown, with the time they appeared.
    pub fn captions(&self) -> Vec<(Instant, String)> {
        self.log
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|(at, c)| match c {
                SurfaceCall::Caption(s) => Some((*at, s.clone())),
                _ => None,
            })
            .collect()
    }

    /// Times at which a transition started animating its entering surface.
    pub fn transition_starts(&self) -> Vec<Instant> {
        let log = self.log.lock().unwrap();
        let mut starts: Vec<Instant> = Vec::new();
        for (at, c) in &log.calls {
            if let SurfaceCall::Animate(..) = c {
                if starts.last() != Some(at) {
                    starts.push(*at);
                }
            }
        }
        starts
    }

    pub fn last_counter(&self) -> Option<(usize, usize)> {
        self.last(|c| match c {
            SurfaceCall::Counter(p, t) => Some((*p, *t)),
            _ => None,
        })
    }

    pub fn last_status(&self) -> Option<String> {
        self.last(|c| match c {
            SurfaceCall::Status(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn last_progress(&self) -> Option<ProgressBar> {
        self.last(|c| match c {
            SurfaceCall::Progress(p) => Some(*p),
            _ => None,
        })
    }

    pub fn controls_visible(&self) -> Option<bool> {
        self.last(|c| match c {
            SurfaceCall::Controls(v) => Some(*v),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.log.lock().unwrap().calls.iter().filter(|(_, c)| pred(c)).count()
    }

    fn last<T>(&self, pick: impl Fn(&SurfaceCall) -> Option<T>) -> Option<T> {
        self.log.lock().unwrap().calls.iter().rev().find_map(|(_, c)| pick(c))
    }
}

impl RenderSurface for RecordingSurface {
    fn set_image(&mut self, surface: SurfaceId, image: &ImageHandle) {
        self.log.lock().unwrap().images[surface.index()] = Some(image.reference().to_string());
        self.push(SurfaceCall::Image(surface, image.reference().to_string()));
    }

    fn animate(&mut self, surface: SurfaceId, animation: &Animation, duration: Duration) {
        self.push(SurfaceCall::Animate(surface, animation.name, duration));
    }

    fn reset(&mut self, surface: SurfaceId) {
        self.push(SurfaceCall::Reset(surface));
    }

    fn set_role(&mut self, surface: SurfaceId, role: Role) {
        self.log.lock().unwrap().roles[surface.index()] = role;
        self.push(SurfaceCall::Role(surface, role));
    }

    fn set_counter(&mut self, position: usize, total: usize) {
        self.push(SurfaceCall::Counter(position, total));
    }

    fn set_status(&mut self, status: &str) {
        self.push(SurfaceCall::Status(status.to_string()));
    }

    fn set_caption(&mut self, caption: &str) {
        self.push(SurfaceCall::Caption(caption.to_string()));
    }

    fn set_progress(&mut self, progress: ProgressBar) {
        self.push(SurfaceCall::Progress(progress));
    }

    fn set_controls_visible(&mut self, visible: bool) {
        self.push(SurfaceCall::Controls(visible));
    }

    fn set_audio_indicator(&mut self, indicator: AudioIndicator) {
        self.push(SurfaceCall::Audio(indicator));
    }

    fn show_no_content(&mut self) {
        self.push(SurfaceCall::NoContent);
    }

    fn hide_no_content(&mut self) {
        self.push(SurfaceCall::ContentRestored);
    }

    fn set_clock(&mut self, text: &str) {
        self.push(SurfaceCall::Clock(text.to_string()));
    }

    fn set_help_visible(&mut self, visible: bool) {
        self.push(SurfaceCall::Help(visible));
    }

    fn request_fullscreen(&mut self, fullscreen: bool) -> bool {
        self.push(SurfaceCall::Fullscreen(fullscreen));
        true
    }
}

/// Image loader that counts calls and fails on request.
#[derive(Debug, Default)]
pub struct ScriptedLoader {
    calls: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl ScriptedLoader {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail(&self, reference: &str) {
        self.failing.lock().unwrap().insert(reference.to_string());
    }

    pub fn calls(&self, reference: &str) -> usize {
        self.calls.lock().unwrap().get(reference).copied().unwrap_or(0)
    }
}

impl ImageLoader for ScriptedLoader {
    fn load<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RgbaImage, MediaError>> {
        Box::pin(async move {
            *self.calls.lock().unwrap().entry(reference.to_string()).or_default() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing.lock().unwrap().contains(reference) {
                return Err(MediaError::BadReference {
                    reference: reference.to_string(),
                    reason: "scripted failure".into(),
                });
            }
            Ok(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])))
        })
    }
}

#[derive(Debug, Default)]
struct SinkState {
    loaded: Vec<String>,
    plays: usize,
    pauses: usize,
    fail_next: Option<SinkError>,
    fail_loads: bool,
    volume: f32,
    muted: bool,
}

/// Audio sink that records what it was asked to do. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSink {
    state: Arc<Mutex<SinkState>>,
}

impl ScriptedSink {
    pub fn loaded(&self) -> Vec<String> {
        self.state.lock().unwrap().loaded.clone()
    }

    pub fn plays(&self) -> usize {
        self.state.lock().unwrap().plays
    }

    pub fn pauses(&self) -> usize {
        self.state.lock().unwrap().pauses
    }

    pub fn fail_next_play(&self, error: SinkError) {
        self.state.lock().unwrap().fail_next = Some(error);
    }

    /// Make every `load` fail until turned off again.
    pub fn fail_loads(&self, fail: bool) {
        self.state.lock().unwrap().fail_loads = fail;
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }
}

impl AudioSink for ScriptedSink {
    fn load(&mut self, track: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_loads {
            return Err(SinkError::Unsupported(track.to_string()));
        }
        state.loaded.push(track.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        if let Some(e) = state.fail_next.take() {
            return Err(e);
        }
        state.plays += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().pauses += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.lock().unwrap().muted = muted;
    }
}

/// Notifier that keeps everything it receives.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.received
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}
