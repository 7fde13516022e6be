//! Fetching and decoding photos.
//!
//! References are opaque strings from the media lists: absolute `http(s)`
//! URLs, paths relative to a configured base URL, or local file paths.

use crate::cache::ImageLoader;
use crate::error::MediaError;
use futures_util::future::BoxFuture;
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the bytes behind a reference live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

/// Loads photos from disk or over HTTP and decodes them off the event loop.
pub struct AssetLoader {
    client: reqwest::Client,
    base_url: Option<Url>,
    root: PathBuf,
    max_dimension: u32,
}

impl AssetLoader {
    pub fn new(
        client: reqwest::Client,
        base_url: Option<Url>,
        root: PathBuf,
        max_dimension: u32,
    ) -> Self {
        Self {
            client,
            base_url,
            root,
            max_dimension,
        }
    }

    /// Resolve a reference to a concrete source.
    pub fn resolve(&self, reference: &str) -> Result<Source, MediaError> {
        let bad = |reason: String| MediaError::BadReference {
            reference: reference.to_string(),
            reason,
        };

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Url::parse(reference)
                .map(Source::Remote)
                .map_err(|e| bad(e.to_string()));
        }
        if let Some(path) = reference.strip_prefix("file://") {
            return Ok(Source::Local(PathBuf::from(path)));
        }
        if let Some(base) = &self.base_url {
            return base
                .join(reference)
                .map(Source::Remote)
                .map_err(|e| bad(e.to_string()));
        }

        let path = Path::new(reference);
        if path.is_absolute() {
            Ok(Source::Local(path.to_path_buf()))
        } else {
            Ok(Source::Local(self.root.join(path)))
        }
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, MediaError> {
        match self.resolve(reference)? {
            Source::Remote(url) => {
                tracing::debug!("Downloading {}", url);
                let fetch_err = |source| MediaError::Fetch {
                    reference: reference.to_string(),
                    source,
                };
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(fetch_err)?;
                let bytes = response.bytes().await.map_err(fetch_err)?;
                Ok(bytes.to_vec())
            }
            Source::Local(path) => {
                tracing::debug!("Reading {:?}", path);
                tokio::fs::read(&path).await.map_err(|source| MediaError::Io {
                    reference: reference.to_string(),
                    source,
                })
            }
        }
    }

    async fn load_image(&self, reference: &str) -> Result<RgbaImage, MediaError> {
        let bytes = self.fetch(reference).await?;
        let max = self.max_dimension;
        let owned = reference.to_string();

        tokio::task::spawn_blocking(move || decode(&owned, &bytes, max))
            .await
            .map_err(|_| MediaError::Worker {
                reference: reference.to_string(),
            })?
    }
}

impl ImageLoader for AssetLoader {
    fn load<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RgbaImage, MediaError>> {
        Box::pin(self.load_image(reference))
    }
}

/// Decode `bytes`, downscaling so neither side exceeds `max_dimension`
/// (0 disables the limit).
pub fn decode(reference: &str, bytes: &[u8], max_dimension: u32) -> Result<RgbaImage, MediaError> {
    let img = image::load_from_memory(bytes).map_err(|source| MediaError::Decode {
        reference: reference.to_string(),
        source,
    })?;

    let oversized = img.width() > max_dimension || img.height() > max_dimension;
    let img = if max_dimension > 0 && oversized {
        tracing::debug!(
            "Downscaling {} from {}x{}",
            reference,
            img.width(),
            img.height()
        );
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        img
    };

    Ok(img.to_rgba8())
}
