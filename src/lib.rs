//! Full-screen photo wall: a cyclic slideshow with animated transitions,
//! background music gated on the first user gesture, and controls that hide
//! themselves when idle.

pub mod assets;
pub mod audio;
pub mod cache;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod idle;
pub mod input;
pub mod library;
pub mod notify;
pub mod playback;
pub mod render;
pub mod session;
pub mod timer;
pub mod transition;

#[cfg(feature = "gstreamer")]
pub mod gst_sink;
#[cfg(feature = "sdl")]
pub mod sdl;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use library::MediaLists;
pub use session::{event_channel, Backends, Slideshow};
