//! In-memory cache of decoded photos.
//!
//! Capacity policy: unbounded. Entries are inserted once per reference and
//! never evicted for the lifetime of the session; a slideshow deck is a
//! bounded set, so memory is bounded by the deck. Failed loads are never
//! cached, so the next request for the same reference fetches again.

use crate::error::MediaError;
use crate::notify::{Notification, Notifier};
use futures_util::future::BoxFuture;
use image::{Rgba, RgbaImage};
use lru::LruCache;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Size of the generated placeholder image.
pub const PLACEHOLDER_WIDTH: u32 = 1920;
pub const PLACEHOLDER_HEIGHT: u32 = 1080;

/// A decoded photo, or a placeholder standing in for one.
#[derive(Debug)]
pub struct Picture {
    reference: String,
    pixels: RgbaImage,
    placeholder: bool,
}

impl Picture {
    pub fn new(reference: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            reference: reference.into(),
            pixels,
            placeholder: false,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Shared handle to a loaded picture. Cache hits hand out clones of the same
/// `Arc`.
pub type ImageHandle = Arc<Picture>;

/// Fetches and decodes the image behind a reference.
pub trait ImageLoader: Send + Sync {
    fn load<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RgbaImage, MediaError>>;
}

/// Position of the requested photo in the deck, used to label placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub total: usize,
}

/// Memoizing photo cache shared between the playback controller and its
/// preload tasks. The controller is the only writer.
pub struct MediaCache {
    loader: Arc<dyn ImageLoader>,
    notifier: Arc<dyn Notifier>,
    entries: RwLock<LruCache<String, ImageHandle>>,
}

impl MediaCache {
    pub fn new(loader: Arc<dyn ImageLoader>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            loader,
            notifier,
            entries: RwLock::new(LruCache::unbounded()),
        }
    }

    /// Synchronous lookup. Returns `None` on a miss or if a writer currently
    /// holds the lock.
    pub fn cached(&self, reference: &str) -> Option<ImageHandle> {
        self.entries.try_read().ok()?.peek(reference).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Return the picture for `reference`, loading it on a miss.
    ///
    /// A failed load yields a placeholder labelled with `slot` and a
    /// non-fatal error notification. The failure is not cached.
    pub async fn preload(&self, reference: &str, slot: Slot) -> ImageHandle {
        if let Some(hit) = self.entries.read().await.peek(reference) {
            tracing::debug!("Cache hit for {}", reference);
            return Arc::clone(hit);
        }

        tracing::debug!("Loading {}", reference);
        match self.loader.load(reference).await {
            Ok(pixels) => {
                let handle = Arc::new(Picture::new(reference, pixels));
                let mut entries = self.entries.write().await;
                // a concurrent load may have won; keep the first handle
                let stored = entries.get_or_insert(reference.to_string(), || Arc::clone(&handle));
                let stored = Arc::clone(stored);
                tracing::debug!("Cached {} ({} entries)", reference, entries.len());
                stored
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {:#}, using placeholder", reference, e);
                self.notifier.notify(Notification::error(
                    format!("Could not load {}", display_name(reference)),
                    3000,
                ));
                Arc::new(placeholder_off_thread(reference, slot).await)
            }
        }
    }
}

/// Draw the placeholder on the blocking pool; it touches every pixel.
async fn placeholder_off_thread(reference: &str, slot: Slot) -> Picture {
    let owned = reference.to_string();
    match tokio::task::spawn_blocking(move || placeholder(&owned, slot)).await {
        Ok(picture) => picture,
        Err(e) => {
            tracing::error!("Placeholder worker for {} failed: {}", reference, e);
            Picture {
                reference: reference.to_string(),
                pixels: RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])),
                placeholder: true,
            }
        }
    }
}

/// Last path segment of a reference, percent-decoded.
pub fn display_name(reference: &str) -> String {
    let trimmed = reference.split(['?', '#']).next().unwrap_or(reference);
    let last = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string())
}

const GRADIENT_FROM: [u8; 3] = [0x1a, 0x29, 0x80];
const GRADIENT_TO: [u8; 3] = [0x26, 0xd0, 0xce];

/// Deterministic stand-in for a photo that failed to load.
///
/// Diagonal gradient with a camera glyph, and a position bar whose filled
/// share is `(index + 1) / total` with one tick per photo (ticks are dropped
/// when there are too many to fit).
pub fn placeholder(reference: &str, slot: Slot) -> Picture {
    let (w, h) = (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
    let mut img = RgbaImage::from_fn(w, h, |x, y| {
        let t = (x as f32 / w as f32 + y as f32 / h as f32) / 2.0;
        let c = |i: usize| {
            let a = GRADIENT_FROM[i] as f32;
            let b = GRADIENT_TO[i] as f32;
            (a + (b - a) * t).round() as u8
        };
        Rgba([c(0), c(1), c(2), 255])
    });

    let light = Rgba([230, 236, 245, 255]);
    let dark = Rgba([GRADIENT_FROM[0], GRADIENT_FROM[1], GRADIENT_FROM[2], 255]);
    fill_circle(&mut img, 960, 400, 120, light);
    fill_circle(&mut img, 960, 400, 80, dark);
    fill_circle(&mut img, 960, 400, 30, light);

    let total = slot.total.max(1);
    let position = slot.index.min(total - 1) + 1;
    let (bar_x, bar_y, bar_w, bar_h) = (560u32, 690u32, 800u32, 24u32);
    let filled = (bar_w as usize * position / total) as u32;
    for y in bar_y..bar_y + bar_h {
        for x in bar_x..bar_x + bar_w {
            let px = if x < bar_x + filled {
                light
            } else {
                Rgba([255, 255, 255, 70])
            };
            img.put_pixel(x, y, px);
        }
    }
    if total <= (bar_w / 4) as usize {
        for i in 1..total {
            let x = bar_x + (bar_w as usize * i / total) as u32;
            for y in bar_y..bar_y + bar_h {
                img.put_pixel(x, y, dark);
            }
        }
    }

    Picture {
        reference: reference.to_string(),
        pixels: img,
        placeholder: true,
    }
}

fn fill_circle(img: &mut RgbaImage, cx: u32, cy: u32, r: u32, color: Rgba<u8>) {
    let r2 = (r * r) as i64;
    for y in cy.saturating_sub(r)..=(cy + r).min(img.height() - 1) {
        for x in cx.saturating_sub(r)..=(cx + r).min(img.width() - 1) {
            let dx = x as i64 - cx as i64;
            let dy = y as i64 - cy as i64;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CollectingNotifier, ScriptedLoader};

    fn cache_with(loader: Arc<ScriptedLoader>) -> (MediaCache, Arc<CollectingNotifier>) {
        let notifier = Arc::new(CollectingNotifier::default());
        (MediaCache::new(loader, notifier.clone()), notifier)
    }

    const SLOT: Slot = Slot { index: 0, total: 3 };

    #[tokio::test]
    async fn hit_reuses_handle_without_refetch() {
        let loader = Arc::new(ScriptedLoader::default());
        let (cache, _) = cache_with(loader.clone());

        let first = cache.preload("a.jpg", SLOT).await;
        let second = cache.preload("a.jpg", SLOT).await;

        assert_eq!(loader.calls("a.jpg"), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &cache.cached("a.jpg").unwrap()));
        assert!(!first.is_placeholder());
    }

    #[tokio::test]
    async fn failure_yields_placeholder_and_is_not_cached() {
        let loader = Arc::new(ScriptedLoader::default());
        loader.fail("broken.png");
        let (cache, notifier) = cache_with(loader.clone());

        let image = cache.preload("broken.png", Slot { index: 1, total: 3 }).await;
        assert!(image.is_placeholder());
        assert_eq!(image.dimensions(), (PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
        assert!(cache.cached("broken.png").is_none());
        assert!(cache.is_empty().await);
        assert_eq!(notifier.errors(), 1);

        cache.preload("broken.png", Slot { index: 1, total: 3 }).await;
        assert_eq!(loader.calls("broken.png"), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn placeholder_is_drawn_off_the_loop() {
        let loader = Arc::new(ScriptedLoader::default());
        loader.fail("broken.png");
        let (cache, _) = cache_with(loader);
        let slot = Slot { index: 2, total: 5 };

        let ticks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let spinner = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        });

        let image = cache.preload("broken.png", slot).await;
        spinner.abort();

        // the loop kept running while the worker drew
        assert!(ticks.load(std::sync::atomic::Ordering::Relaxed) > 0);
        assert!(image.is_placeholder());
        assert_eq!(
            image.pixels().as_raw(),
            placeholder("broken.png", slot).pixels().as_raw()
        );
    }

    #[test]
    fn placeholder_is_deterministic_and_encodes_position() {
        let a = placeholder("x", Slot { index: 1, total: 4 });
        let b = placeholder("x", Slot { index: 1, total: 4 });
        assert_eq!(a.pixels().as_raw(), b.pixels().as_raw());

        let c = placeholder("x", Slot { index: 2, total: 4 });
        assert_ne!(a.pixels().as_raw(), c.pixels().as_raw());
    }

    #[test]
    fn display_name_decodes_last_segment() {
        assert_eq!(
            display_name("assets/photos/summer%20trip.jpg"),
            "summer trip.jpg"
        );
        assert_eq!(
            display_name("https://example.com/p/a.png?w=1920"),
            "a.png"
        );
        assert_eq!(display_name("plain.jpg"), "plain.jpg");
    }
}
