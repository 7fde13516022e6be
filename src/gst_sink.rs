//! GStreamer music output.
//!
//! One `playbin` element plays the assigned track. A bus thread forwards
//! end-of-stream and error messages to the session loop.

use crate::audio::AudioSink;
use crate::error::SinkError;
use crate::session::{AudioEvent, EventSender, SessionEvent};
use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use url::Url;

const BUS_POLL_MS: u64 = 100;

pub struct GstSink {
    playbin: gst::Element,
    stop: Arc<AtomicBool>,
    bus_thread: Option<JoinHandle<()>>,
}

impl GstSink {
    /// Initialize GStreamer (call once at startup).
    pub fn init() -> Result<()> {
        gst::init().context("Failed to initialize GStreamer")?;
        tracing::info!("GStreamer initialized: {}", gst::version_string());
        Ok(())
    }

    pub fn new(events: EventSender) -> Result<Self> {
        let video_sink = gst::ElementFactory::make("fakesink")
            .build()
            .context("Failed to create fakesink")?;
        let playbin = gst::ElementFactory::make("playbin")
            .name("music")
            .property("video-sink", &video_sink)
            .build()
            .context("Failed to create playbin")?;

        let bus = playbin.bus().context("playbin has no bus")?;
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);

        let bus_thread = std::thread::Builder::new()
            .name("gst-bus".into())
            .spawn(move || {
                while !stopped.load(Ordering::Relaxed) {
                    let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(BUS_POLL_MS)) else {
                        continue;
                    };
                    let event = match msg.view() {
                        gst::MessageView::Eos(_) => AudioEvent::TrackEnded,
                        gst::MessageView::Error(err) => {
                            tracing::error!("GStreamer error: {} ({:?})", err.error(), err.debug());
                            AudioEvent::Failed(err.error().to_string())
                        }
                        _ => continue,
                    };
                    if !events.send(SessionEvent::Audio(event)) {
                        break;
                    }
                }
                tracing::debug!("GStreamer bus thread stopped");
            })
            .context("Failed to spawn bus thread")?;

        Ok(Self {
            playbin,
            stop,
            bus_thread: Some(bus_thread),
        })
    }

    fn uri(track: &str) -> Result<String, SinkError> {
        if track.contains("://") {
            return Ok(track.to_string());
        }
        let path = std::fs::canonicalize(Path::new(track))
            .map_err(|e| SinkError::Unsupported(format!("{}: {}", track, e)))?;
        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|_| SinkError::Unsupported(track.to_string()))
    }
}

impl AudioSink for GstSink {
    fn load(&mut self, track: &str) -> Result<(), SinkError> {
        let uri = Self::uri(track)?;
        tracing::debug!("Loading music {}", uri);
        self.playbin
            .set_state(gst::State::Null)
            .map_err(|e| SinkError::Backend(e.to_string()))?;
        self.playbin.set_property("uri", &uri);
        Ok(())
    }

    fn play(&mut self) -> Result<(), SinkError> {
        self.playbin
            .set_state(gst::State::Playing)
            .map(|_| ())
            .map_err(|e| SinkError::Backend(e.to_string()))
    }

    fn pause(&mut self) {
        if let Err(e) = self.playbin.set_state(gst::State::Paused) {
            tracing::warn!("Failed to pause music: {}", e);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.playbin.set_property("volume", volume as f64);
    }

    fn set_muted(&mut self, muted: bool) {
        self.playbin.set_property("mute", muted);
    }
}

impl Drop for GstSink {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.playbin.set_state(gst::State::Null);
        if let Some(handle) = self.bus_thread.take() {
            let _ = handle.join();
        }
    }
}
