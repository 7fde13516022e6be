//! Background music.
//!
//! The synchronizer owns the playlist and the sink. Playback never starts
//! before the first user gesture; until then a track is assigned to the sink
//! and the viewer is prompted to interact.

use crate::config::MusicSettings;
use crate::error::SinkError;
use crate::notify::{Notification, Notifier};
use crate::render::{AudioIndicator, RenderSurface};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const TAP_PROMPT: &str = "Click anywhere to start the music";

/// Output device for music tracks.
///
/// Completion and asynchronous failures are reported through the session
/// event channel as [`crate::session::AudioEvent`]s.
pub trait AudioSink: Send {
    /// Assign a track. Playback does not start until [`AudioSink::play`].
    fn load(&mut self, track: &str) -> Result<(), SinkError>;
    fn play(&mut self) -> Result<(), SinkError>;
    /// Pause without clearing the assigned track.
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Sink that accepts every track and never makes a sound.
#[derive(Debug, Default)]
pub struct SilentSink {
    track: Option<String>,
}

impl AudioSink for SilentSink {
    fn load(&mut self, track: &str) -> Result<(), SinkError> {
        tracing::debug!("Music track assigned: {}", track);
        self.track = Some(track.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), SinkError> {
        tracing::debug!("Music playing (silent sink): {:?}", self.track);
        Ok(())
    }

    fn pause(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Result of an [`AudioSynchronizer::ensure_playing`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Music disabled or no tracks.
    Disabled,
    /// Track assigned but waiting for a gesture, or refused by the platform.
    Deferred,
    Playing,
    Failed,
}

pub struct AudioSynchronizer {
    playlist: Vec<String>,
    pointer: usize,
    shuffle: bool,
    enabled: bool,
    volume: f32,
    muted: bool,
    gesture_seen: bool,
    assigned: Option<usize>,
    sounding: bool,
    sink: Box<dyn AudioSink>,
    notifier: Arc<dyn Notifier>,
    rng: StdRng,
}

impl AudioSynchronizer {
    pub fn new(
        playlist: Vec<String>,
        settings: &MusicSettings,
        sink: Box<dyn AudioSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let enabled = settings.enabled && !playlist.is_empty();
        if settings.enabled && playlist.is_empty() {
            tracing::info!("No music tracks found, music disabled");
        }
        Self {
            playlist,
            pointer: 0,
            shuffle: settings.shuffle,
            enabled,
            volume: settings.volume.clamp(0.0, 1.0),
            muted: false,
            gesture_seen: false,
            assigned: None,
            sounding: false,
            sink,
            notifier,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source used for shuffle picks.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Assign the next track and start it if a gesture has been seen.
    pub fn ensure_playing(&mut self, render: &mut dyn RenderSurface) -> TrackOutcome {
        if !self.enabled || self.playlist.is_empty() {
            tracing::debug!("Music disabled or playlist empty");
            return TrackOutcome::Disabled;
        }

        let len = self.playlist.len();
        let index = if self.shuffle {
            self.rng.gen_range(0..len)
        } else {
            let i = self.pointer % len;
            self.pointer = (i + 1) % len;
            i
        };
        self.assigned = None;
        self.sounding = false;

        let track = &self.playlist[index];
        tracing::info!("Music track {}/{}: {}", index + 1, len, track);
        if let Err(e) = self.sink.load(track) {
            self.report_failure(&e, render);
            return TrackOutcome::Failed;
        }
        self.assigned = Some(index);
        self.sink.set_volume(self.volume);
        self.sink.set_muted(self.muted);

        if !self.gesture_seen {
            tracing::debug!("No user gesture yet, deferring music");
            self.notifier.notify(Notification::info(TAP_PROMPT, 2000));
            self.refresh_indicator(render);
            return TrackOutcome::Deferred;
        }

        self.start_sink(render)
    }

    fn start_sink(&mut self, render: &mut dyn RenderSurface) -> TrackOutcome {
        let outcome = match self.sink.play() {
            Ok(()) => {
                self.sounding = true;
                TrackOutcome::Playing
            }
            Err(SinkError::AutoplayBlocked) => {
                tracing::info!("Music autoplay blocked by the platform");
                self.notifier.notify(Notification::info(TAP_PROMPT, 2000));
                TrackOutcome::Deferred
            }
            Err(e) => {
                self.report_failure(&e, render);
                return TrackOutcome::Failed;
            }
        };
        self.refresh_indicator(render);
        outcome
    }

    /// Pause the sink, keeping the assigned track.
    pub fn silence(&mut self, render: &mut dyn RenderSurface) {
        if self.assigned.is_some() {
            self.sink.pause();
        }
        self.sounding = false;
        self.refresh_indicator(render);
    }

    /// Record a user gesture. The first one while the slideshow is playing
    /// starts the deferred track. Returns true for the first gesture.
    pub fn record_gesture(&mut self, playing: bool, render: &mut dyn RenderSurface) -> bool {
        if self.gesture_seen {
            return false;
        }
        self.gesture_seen = true;
        tracing::info!("User gesture seen, music unlocked");

        if playing && self.enabled {
            if self.assigned.is_some() {
                self.start_sink(render);
            } else {
                self.ensure_playing(render);
            }
        }
        true
    }

    /// The sink finished the current track.
    pub fn on_track_ended(&mut self, playing: bool, render: &mut dyn RenderSurface) {
        tracing::debug!("Music track ended");
        self.sounding = false;
        if playing {
            self.ensure_playing(render);
        } else {
            self.refresh_indicator(render);
        }
    }

    /// The sink reported an asynchronous failure.
    pub fn on_sink_error(&mut self, message: &str, render: &mut dyn RenderSurface) {
        self.report_failure(&SinkError::Backend(message.to_string()), render);
    }

    fn report_failure(&mut self, error: &SinkError, render: &mut dyn RenderSurface) {
        tracing::error!("Music playback failed: {}", error);
        self.sounding = false;
        self.notifier.notify(Notification::error(
            "Music failed to load, check the file format",
            3000,
        ));
        self.refresh_indicator(render);
    }

    pub fn set_volume(&mut self, volume: f32, render: &mut dyn RenderSurface) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
        self.refresh_indicator(render);
    }

    pub fn set_muted(&mut self, muted: bool, render: &mut dyn RenderSurface) {
        self.muted = muted;
        self.sink.set_muted(muted);
        self.refresh_indicator(render);
    }

    pub fn toggle_mute(&mut self, render: &mut dyn RenderSurface) {
        self.set_muted(!self.muted, render);
    }

    /// Swap in a new playlist. Music is switched on when it has tracks.
    pub fn replace_playlist(&mut self, playlist: Vec<String>, render: &mut dyn RenderSurface) {
        if self.assigned.is_some() {
            self.sink.pause();
        }
        tracing::info!("Playlist replaced, {} tracks", playlist.len());
        self.enabled = !playlist.is_empty();
        self.playlist = playlist;
        self.pointer = 0;
        self.assigned = None;
        self.sounding = false;
        self.refresh_indicator(render);
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    fn refresh_indicator(&self, render: &mut dyn RenderSurface) {
        render.set_audio_indicator(AudioIndicator {
            sounding: self.sounding,
            muted: self.muted,
            volume: self.volume,
        });
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn assigned_track(&self) -> Option<&str> {
        self.assigned.map(|i| self.playlist[i].as_str())
    }

    pub fn gesture_seen(&self) -> bool {
        self.gesture_seen
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::testing::{CollectingNotifier, RecordingSurface, ScriptedSink};

    fn tracks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("track{}.mp3", i)).collect()
    }

    fn synchronizer(
        playlist: Vec<String>,
        shuffle: bool,
    ) -> (AudioSynchronizer, ScriptedSink, Arc<CollectingNotifier>) {
        let sink = ScriptedSink::default();
        let notifier = Arc::new(CollectingNotifier::default());
        let settings = MusicSettings {
            shuffle,
            ..MusicSettings::default()
        };
        let sync =
            AudioSynchronizer::new(playlist, &settings, Box::new(sink.clone()), notifier.clone())
                .with_rng(StdRng::seed_from_u64(11));
        (sync, sink, notifier)
    }

    #[test]
    fn sequential_mode_cycles_back_to_first_track() {
        let (mut sync, sink, _) = synchronizer(tracks(3), false);
        let mut render = RecordingSurface::default();
        sync.record_gesture(false, &mut render);

        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Playing);
        assert_eq!(sync.assigned_track(), Some("track0.mp3"));
        for _ in 0..3 {
            sync.on_track_ended(true, &mut render);
        }
        assert_eq!(sync.assigned_track(), Some("track0.mp3"));
        assert_eq!(
            sink.loaded(),
            ["track0.mp3", "track1.mp3", "track2.mp3", "track0.mp3"]
        );
    }

    #[test]
    fn shuffle_never_moves_the_pointer() {
        let (mut sync, sink, _) = synchronizer(tracks(5), true);
        let mut render = RecordingSurface::default();
        sync.record_gesture(false, &mut render);

        for _ in 0..20 {
            sync.ensure_playing(&mut render);
            assert_eq!(sync.pointer(), 0);
        }
        assert_eq!(sink.loaded().len(), 20);
    }

    #[test]
    fn no_playback_before_gesture() {
        let (mut sync, sink, notifier) = synchronizer(tracks(2), false);
        let mut render = RecordingSurface::default();

        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Deferred);
        assert_eq!(sink.plays(), 0);
        assert_eq!(notifier.count(Severity::Info), 1);

        sync.record_gesture(false, &mut render);
        assert_eq!(sink.plays(), 0);
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Playing);
        assert_eq!(sink.plays(), 1);
    }

    #[test]
    fn first_gesture_while_playing_starts_deferred_track() {
        let (mut sync, sink, _) = synchronizer(tracks(2), false);
        let mut render = RecordingSurface::default();

        sync.ensure_playing(&mut render);
        assert!(sync.record_gesture(true, &mut render));
        assert_eq!(sink.plays(), 1);
        assert_eq!(sink.loaded(), ["track0.mp3"]);
        assert!(sync.is_sounding());
        assert!(!sync.record_gesture(true, &mut render));
    }

    #[test]
    fn disabled_without_tracks() {
        let (mut sync, sink, _) = synchronizer(Vec::new(), false);
        let mut render = RecordingSurface::default();
        assert!(!sync.enabled());
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Disabled);
        assert!(sink.loaded().is_empty());
    }

    #[test]
    fn sink_failures_are_reported_not_fatal() {
        let (mut sync, sink, notifier) = synchronizer(tracks(2), false);
        let mut render = RecordingSurface::default();
        sync.record_gesture(false, &mut render);

        sink.fail_next_play(SinkError::Unsupported("track0.mp3".into()));
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Failed);
        assert_eq!(notifier.errors(), 1);

        sink.fail_next_play(SinkError::AutoplayBlocked);
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Deferred);
        assert_eq!(notifier.errors(), 1);

        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Playing);
    }

    #[test]
    fn failed_load_leaves_nothing_to_start() {
        let (mut sync, sink, notifier) = synchronizer(tracks(2), false);
        let mut render = RecordingSurface::default();

        sink.fail_loads(true);
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Failed);
        assert_eq!(sync.assigned_track(), None);

        // the gesture retries with the following track instead of playing nothing
        assert!(sync.record_gesture(true, &mut render));
        assert_eq!(sink.plays(), 0);
        assert!(!sync.is_sounding());
        assert_eq!(notifier.errors(), 2);

        sink.fail_loads(false);
        sync.on_track_ended(true, &mut render);
        assert_eq!(sync.assigned_track(), Some("track0.mp3"));
        assert_eq!(sink.plays(), 1);
        assert!(sync.is_sounding());
    }

    #[test]
    fn replaced_playlist_enables_music() {
        let (mut sync, sink, _) = synchronizer(Vec::new(), false);
        let mut render = RecordingSurface::default();
        assert!(!sync.enabled());

        sync.replace_playlist(tracks(2), &mut render);
        assert!(sync.enabled());
        sync.record_gesture(false, &mut render);
        assert_eq!(sync.ensure_playing(&mut render), TrackOutcome::Playing);
        assert_eq!(sink.loaded(), ["track0.mp3"]);
    }

    #[test]
    fn volume_and_mute_apply_immediately() {
        let (mut sync, sink, _) = synchronizer(tracks(1), false);
        let mut render = RecordingSurface::default();
        sync.set_volume(1.7, &mut render);
        assert_eq!(sink.volume(), 1.0);
        sync.toggle_mute(&mut render);
        assert!(sink.muted());
        sync.silence(&mut render);
        assert_eq!(sink.pauses(), 0);
    }
}
