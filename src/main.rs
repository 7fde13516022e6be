use anyhow::{Context, Result};
use photo_wall::assets::AssetLoader;
use photo_wall::audio::AudioSink;
use photo_wall::cache::ImageLoader;
use photo_wall::notify::{Notifier, TracingNotifier};
use photo_wall::render::RenderSurface;
use photo_wall::session::EventSender;
use photo_wall::{event_channel, Backends, MediaLists, Settings, Slideshow};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_CONFIG: &str = "photo-wall.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("photo_wall=info")),
        )
        .init();

    let config_path = std::env::var_os("PHOTO_WALL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let settings = Settings::load(Some(&config_path))?;
    tracing::info!("Settings loaded (file {:?})", config_path);

    let lists = match &settings.media.manifest {
        Some(manifest) => MediaLists::from_manifest(manifest)?,
        None => MediaLists::scan(&settings.media.photos_dir, &settings.media.music_dir),
    };
    tracing::info!(
        "{} photos, {} music tracks",
        lists.photos.len(),
        lists.music.len()
    );

    let (events, receiver) = event_channel();
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let backends = Backends {
        loader: asset_loader(&settings)?,
        render: render_surface()?,
        sink: audio_sink(events.clone())?,
        notifier,
    };
    let slideshow = Slideshow::new(lists, &settings, backends, events, receiver);

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupted, shutting down");
                on_signal.cancel();
            }
            Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    // window surfaces deliver input through `poll_input`; keep the channel open
    let (_inputs, inputs_rx) = mpsc::channel(32);
    slideshow.run(inputs_rx, shutdown).await;
    Ok(())
}

fn asset_loader(settings: &Settings) -> Result<Arc<dyn ImageLoader>> {
    let base_url = settings
        .media
        .base_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("Invalid media.base_url")?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("photo-wall/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let root = std::env::current_dir().context("Failed to read working directory")?;
    Ok(Arc::new(AssetLoader::new(
        client,
        base_url,
        root,
        settings.media.max_dimension,
    )))
}

#[cfg(feature = "sdl")]
fn render_surface() -> Result<Box<dyn RenderSurface>> {
    Ok(Box::new(photo_wall::sdl::SdlSurface::new()?))
}

#[cfg(not(feature = "sdl"))]
fn render_surface() -> Result<Box<dyn RenderSurface>> {
    tracing::info!("Built without a window backend, running headless");
    Ok(Box::new(photo_wall::render::HeadlessSurface::new()))
}

#[cfg(feature = "gstreamer")]
fn audio_sink(events: EventSender) -> Result<Box<dyn AudioSink>> {
    photo_wall::gst_sink::GstSink::init()?;
    Ok(Box::new(photo_wall::gst_sink::GstSink::new(events)?))
}

#[cfg(not(feature = "gstreamer"))]
fn audio_sink(_events: EventSender) -> Result<Box<dyn AudioSink>> {
    tracing::info!("Built without an audio backend, music is silent");
    Ok(Box::new(photo_wall::audio::SilentSink::default()))
}
