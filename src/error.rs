//! Error types shared across the slideshow engine.
//!
//! Every failure here is recoverable: callers log it, surface a notification
//! and keep the session running.

use thiserror::Error;

/// A photo could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid media reference `{reference}`: {reason}")]
    BadReference { reference: String, reason: String },

    #[error("failed to read `{reference}`")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch `{reference}`")]
    Fetch {
        reference: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode `{reference}`")]
    Decode {
        reference: String,
        #[source]
        source: image::ImageError,
    },

    #[error("decoder worker for `{reference}` did not finish")]
    Worker { reference: String },
}

impl MediaError {
    /// The media reference the failure belongs to.
    pub fn reference(&self) -> &str {
        match self {
            MediaError::BadReference { reference, .. }
            | MediaError::Io { reference, .. }
            | MediaError::Fetch { reference, .. }
            | MediaError::Decode { reference, .. }
            | MediaError::Worker { reference } => reference,
        }
    }
}

/// Failures reported by an audio sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The platform refused to start playback without a user gesture.
    #[error("playback blocked until the viewer interacts")]
    AutoplayBlocked,

    #[error("unsupported track `{0}`")]
    Unsupported(String),

    #[error("audio backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a transition is already waiting for its role swap")]
    Busy,
}
