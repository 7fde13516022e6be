//! Layered settings: built-in defaults, an optional TOML file, then
//! `PHOTO_WALL__SECTION__KEY` environment variables.

use crate::clock;
use crate::library::MediaLists;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest transition allowed when it is derived from the interval.
const MAX_DERIVED_TRANSITION_MS: u64 = 1500;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub music: MusicSettings,
    pub ui: UiSettings,
    pub media: MediaSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Time between automatic advances.
    pub interval_ms: u64,
    pub transition_ms: u64,
    /// Effect name or `random`.
    pub effect: String,
    /// Start playing on launch.
    pub autoplay: bool,
    pub autoplay_delay_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            transition_ms: 1200,
            effect: "fade".into(),
            autoplay: true,
            autoplay_delay_ms: 1000,
        }
    }
}

impl PlaybackSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Configured transition, shortened to the derived length when it would
    /// not fit inside the interval.
    pub fn transition(&self) -> Duration {
        let configured = Duration::from_millis(self.transition_ms);
        if configured < self.interval() {
            configured
        } else {
            derived_transition(self.interval())
        }
    }
}

/// Transition length that goes with an interval: 30% of it, at most 1.5s.
pub fn derived_transition(interval: Duration) -> Duration {
    let ms = (interval.as_millis() as u64 * 3 / 10).min(MAX_DERIVED_TRANSITION_MS);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    pub enabled: bool,
    /// 0.0 to 1.0.
    pub volume: f32,
    pub shuffle: bool,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
            shuffle: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Hide the controls after `idle_timeout_ms` without activity in
    /// full-screen.
    pub auto_hide_controls: bool,
    pub idle_timeout_ms: u64,
    pub show_clock: bool,
    /// strftime pattern for the clock.
    pub clock_format: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            auto_hide_controls: true,
            idle_timeout_ms: 3000,
            show_clock: true,
            clock_format: clock::DEFAULT_FORMAT.into(),
        }
    }
}

impl UiSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// JSON file list; takes precedence over directory scanning.
    pub manifest: Option<PathBuf>,
    pub photos_dir: PathBuf,
    pub music_dir: PathBuf,
    /// Base URL for relative references served over HTTP.
    pub base_url: Option<String>,
    /// Decoded photos are downscaled to fit this size. 0 keeps full size.
    pub max_dimension: u32,
    /// Deck offered from the no-content screen.
    pub demo: MediaLists,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            manifest: None,
            photos_dir: PathBuf::from("assets/photos"),
            music_dir: PathBuf::from("assets/music"),
            base_url: None,
            max_dimension: 2560,
            demo: MediaLists::demo(),
        }
    }
}

impl Settings {
    /// Load settings, layering `path` (if it exists) and the environment over
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("PHOTO_WALL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()
    }

    fn validate(mut self) -> Result<Self> {
        if self.playback.interval_ms == 0 {
            bail!("playback.interval_ms must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.music.volume) {
            tracing::warn!("music.volume {} out of range, clamping", self.music.volume);
            self.music.volume = self.music.volume.clamp(0.0, 1.0);
        }
        if !clock::is_valid_format(&self.ui.clock_format) {
            tracing::warn!(
                "ui.clock_format {:?} is not a valid pattern, using {:?}",
                self.ui.clock_format,
                clock::DEFAULT_FORMAT
            );
            self.ui.clock_format = clock::DEFAULT_FORMAT.into();
        }
        if self.playback.transition_ms >= self.playback.interval_ms {
            tracing::warn!(
                "Transition of {}ms does not fit the {}ms interval, using {:?}",
                self.playback.transition_ms,
                self.playback.interval_ms,
                self.playback.transition()
            );
        }
        Ok(self)
    }
}
