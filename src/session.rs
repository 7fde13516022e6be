//! The slideshow session.
//!
//! [`Slideshow`] owns every piece of session state: the playback controller,
//! the music synchronizer, the idle controller and the render surface. It runs
//! a single cooperative loop on the current task. Spawned work (advance ticks,
//! preloads, audio backend callbacks) reports back through the session event
//! channel, so all state changes happen on the loop.

use crate::audio::{AudioSink, AudioSynchronizer};
use crate::cache::{ImageHandle, ImageLoader, MediaCache};
use crate::clock;
use crate::config::Settings;
use crate::idle::IdleUiController;
use crate::input::{Command, UserInput};
use crate::library::MediaLists;
use crate::notify::{Notification, Notifier};
use crate::playback::{PlaybackContext, PlaybackController};
use crate::render::RenderSurface;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Reports from the music backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    TrackEnded,
    Failed(String),
}

/// Work finished off the session loop.
#[derive(Debug)]
pub enum SessionEvent {
    AdvanceDue {
        generation: u64,
    },
    Preloaded {
        request: u64,
        index: usize,
        image: ImageHandle,
    },
    Audio(AudioEvent),
}

/// Cloneable handle for posting [`SessionEvent`]s to the loop.
#[derive(Debug, Clone)]
pub struct EventSender(UnboundedSender<SessionEvent>);

impl EventSender {
    /// Post an event. Returns false once the session has gone away.
    pub fn send(&self, event: SessionEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

pub fn event_channel() -> (EventSender, UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender(tx), rx)
}

/// Backends a session is built from.
pub struct Backends {
    pub loader: Arc<dyn ImageLoader>,
    pub render: Box<dyn RenderSurface>,
    pub sink: Box<dyn AudioSink>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct Slideshow {
    playback: PlaybackController,
    audio: AudioSynchronizer,
    idle: IdleUiController,
    render: Box<dyn RenderSurface>,
    notifier: Arc<dyn Notifier>,
    events: EventSender,
    receiver: UnboundedReceiver<SessionEvent>,
    tracks: usize,
    idle_timeout: Duration,
    autoplay: Option<Duration>,
    autostart_at: Option<Instant>,
    clock_format: Option<String>,
    help_visible: bool,
    demo: MediaLists,
}

impl Slideshow {
    /// Build a session. `events`/`receiver` come from [`event_channel`]; the
    /// sender may already be shared with the audio backend.
    pub fn new(
        lists: MediaLists,
        settings: &Settings,
        backends: Backends,
        events: EventSender,
        receiver: UnboundedReceiver<SessionEvent>,
    ) -> Self {
        let Backends {
            loader,
            render,
            sink,
            notifier,
        } = backends;
        let tracks = lists.music.len();

        let cache = Arc::new(MediaCache::new(loader, Arc::clone(&notifier)));
        let playback = PlaybackController::new(
            lists.photos,
            &settings.playback,
            cache,
            Arc::clone(&notifier),
        );
        let audio = AudioSynchronizer::new(
            lists.music,
            &settings.music,
            sink,
            Arc::clone(&notifier),
        );

        Self {
            playback,
            audio,
            idle: IdleUiController::new(&settings.ui),
            render,
            notifier,
            events,
            receiver,
            tracks,
            idle_timeout: settings.ui.idle_timeout(),
            autoplay: settings
                .playback
                .autoplay
                .then(|| Duration::from_millis(settings.playback.autoplay_delay_ms)),
            autostart_at: None,
            clock_format: settings
                .ui
                .show_clock
                .then(|| settings.ui.clock_format.clone()),
            help_visible: false,
            demo: settings.media.demo.clone(),
        }
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn audio(&self) -> &AudioSynchronizer {
        &self.audio
    }

    pub fn idle(&self) -> &IdleUiController {
        &self.idle
    }

    /// Run until `shutdown` fires or a quit input arrives.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<UserInput>, shutdown: CancellationToken) {
        self.open(Instant::now());

        let mut frames = self.render.frame_interval().map(skipping_interval);
        let mut clock = self
            .clock_format
            .is_some()
            .then(|| skipping_interval(CLOCK_PERIOD));
        let mut inputs_open = true;

        loop {
            let swap_at = self.playback.swap_due();
            let idle_at = self.idle.deadline();
            let autostart_at = self.autostart_at;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => {
                        if !self.handle_input(input, Instant::now()) {
                            break;
                        }
                    }
                    None => inputs_open = false,
                },
                Some(event) = self.receiver.recv() => self.handle_event(event, Instant::now()),
                _ = sleep_until_some(swap_at) => {
                    let now = Instant::now();
                    let mut cx = PlaybackContext {
                        render: self.render.as_mut(),
                        audio: &mut self.audio,
                        events: &self.events,
                    };
                    self.playback.on_swap_due(now, &mut cx);
                }
                _ = sleep_until_some(idle_at) => {
                    self.idle.on_deadline(Instant::now(), self.render.as_mut());
                }
                _ = sleep_until_some(autostart_at) => self.autostart(),
                _ = next_tick(&mut clock) => self.refresh_clock(),
                _ = next_tick(&mut frames) => {
                    self.render.present(Instant::now());
                    let mut quit = false;
                    for input in self.render.poll_input() {
                        if !self.handle_input(input, Instant::now()) {
                            quit = true;
                            break;
                        }
                    }
                    if quit {
                        break;
                    }
                }
            }
        }

        tracing::info!("Slideshow stopped");
    }

    /// Show the first photo, greet the viewer and schedule auto-start.
    pub fn open(&mut self, now: Instant) {
        self.render.set_status("Paused");
        self.render.set_controls_visible(true);
        self.refresh_clock();

        let photos = self.playback.deck().len();
        if photos == 0 {
            tracing::warn!("No photos found");
            self.render.show_no_content();
            return;
        }

        let mut cx = PlaybackContext {
            render: self.render.as_mut(),
            audio: &mut self.audio,
            events: &self.events,
        };
        self.playback.show_photo(0, now, &mut cx);
        self.autostart_at = self.autoplay.map(|delay| now + delay);

        let mut message = format!("Loaded {} photos", photos);
        if self.tracks > 0 {
            message.push_str(&format!(
                ", {} tracks\nClick anywhere to start the music",
                self.tracks
            ));
        }
        message.push_str(&format!(
            "\nIn full-screen, move the pointer to show the controls; they hide after {}s idle",
            self.idle_timeout.as_secs()
        ));
        self.notifier.notify(Notification::success(message, 5000));
    }

    fn refresh_clock(&mut self) {
        if let Some(format) = &self.clock_format {
            let text = clock::clock_text(&chrono::Local::now(), format);
            self.render.set_clock(&text);
        }
    }

    fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
        tracing::debug!(visible = self.help_visible, "help overlay");
        self.render.set_help_visible(self.help_visible);
    }

    /// Replace an empty deck with the demo deck and start playing it.
    fn use_demo_content(&mut self, now: Instant) {
        if !self.playback.deck().is_empty() {
            tracing::debug!("Photos already loaded, ignoring demo request");
            return;
        }
        if self.demo.photos.is_empty() {
            tracing::warn!("Demo content requested but none is configured");
            self.notifier.notify(Notification::warning("No demo content configured", 3000));
            return;
        }

        let demo = self.demo.clone();
        if !self.playback.replace_deck(demo.photos) {
            return;
        }
        self.tracks = demo.music.len();
        self.audio.replace_playlist(demo.music, self.render.as_mut());
        self.render.hide_no_content();

        let mut cx = PlaybackContext {
            render: self.render.as_mut(),
            audio: &mut self.audio,
            events: &self.events,
        };
        self.playback.show_photo(0, now, &mut cx);
        self.playback.start(&mut cx);
        self.notifier.notify(Notification::info("Using demo content", 3000));
    }

    fn autostart(&mut self) {
        self.autostart_at = None;
        if self.playback.is_playing() {
            return;
        }
        let mut cx = PlaybackContext {
            render: self.render.as_mut(),
            audio: &mut self.audio,
            events: &self.events,
        };
        self.playback.start(&mut cx);
    }

    /// Apply one user input. Returns false when the session should end.
    pub fn handle_input(&mut self, input: UserInput, now: Instant) -> bool {
        tracing::trace!(?input, "input");
        if input.is_activity() {
            self.idle.on_pointer_activity(now, self.render.as_mut());
        }
        if input.is_gesture() {
            self.audio
                .record_gesture(self.playback.is_playing(), self.render.as_mut());
        }

        if let Some(command) = input.command() {
            self.run_command(command, now);
            return true;
        }

        match input {
            UserInput::PointerEnteredControls => {
                self.idle.on_pointer_enter_controls(self.render.as_mut())
            }
            UserInput::PointerLeftControls => self.idle.on_pointer_leave_controls(now),
            UserInput::PointerLeftWindow => self.idle.on_pointer_left_window(self.render.as_mut()),
            UserInput::FullscreenChanged(fullscreen) => {
                self.idle
                    .on_fullscreen_change(fullscreen, now, self.render.as_mut())
            }
            UserInput::SetVolume(volume) => self.audio.set_volume(volume, self.render.as_mut()),
            UserInput::SetInterval(period) => {
                let mut cx = PlaybackContext {
                    render: self.render.as_mut(),
                    audio: &mut self.audio,
                    events: &self.events,
                };
                self.playback.set_interval(period, &mut cx);
            }
            UserInput::SelectEffect(choice) => self.playback.select_effect(choice),
            UserInput::SetShuffle(shuffle) => self.audio.set_shuffle(shuffle),
            UserInput::Quit => return false,
            UserInput::PointerMoved
            | UserInput::PointerEnteredWindow
            | UserInput::Click
            | UserInput::Key(_)
            | UserInput::Command(_) => {}
        }
        true
    }

    fn run_command(&mut self, command: Command, now: Instant) {
        let mut cx = PlaybackContext {
            render: self.render.as_mut(),
            audio: &mut self.audio,
            events: &self.events,
        };
        match command {
            Command::TogglePlay => self.playback.toggle(&mut cx),
            Command::Prev => self.playback.prev(now, &mut cx),
            Command::Next => self.playback.next(now, &mut cx),
            Command::ToggleMute => self.audio.toggle_mute(self.render.as_mut()),
            Command::ToggleFullscreen => self.set_fullscreen(!self.idle.is_fullscreen(), now),
            Command::ExitFullscreen => {
                if self.idle.is_fullscreen() {
                    self.set_fullscreen(false, now);
                }
            }
            Command::ToggleControls => self.idle.toggle_controls(now, self.render.as_mut()),
            Command::ToggleHelp => self.toggle_help(),
            Command::UseDemoContent => self.use_demo_content(now),
        }
    }

    fn set_fullscreen(&mut self, fullscreen: bool, now: Instant) {
        if self.render.request_fullscreen(fullscreen) {
            self.idle
                .on_fullscreen_change(fullscreen, now, self.render.as_mut());
        }
    }

    /// Apply one event posted by spawned work.
    pub fn handle_event(&mut self, event: SessionEvent, now: Instant) {
        let mut cx = PlaybackContext {
            render: self.render.as_mut(),
            audio: &mut self.audio,
            events: &self.events,
        };
        match event {
            SessionEvent::AdvanceDue { generation } => {
                self.playback.on_advance_tick(generation, now, &mut cx)
            }
            SessionEvent::Preloaded {
                request,
                index,
                image,
            } => self.playback.on_preloaded(request, index, image, now, &mut cx),
            SessionEvent::Audio(AudioEvent::TrackEnded) => {
                let playing = self.playback.is_playing();
                self.audio.on_track_ended(playing, self.render.as_mut())
            }
            SessionEvent::Audio(AudioEvent::Failed(message)) => {
                self.audio.on_sink_error(&message, self.render.as_mut())
            }
        }
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

fn skipping_interval(period: Duration) -> Interval {
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticks
}

async fn next_tick(ticks: &mut Option<Interval>) {
    match ticks {
        Some(ticks) => {
            ticks.tick().await;
        }
        None => pending().await,
    }
}
