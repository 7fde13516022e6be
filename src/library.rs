//! Media lists: which photos and tracks the session plays.
//!
//! Lists come from a JSON manifest (`{"photos": [...], "music": [...]}`) or
//! from scanning a photo and a music directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac"];

const DEMO_PHOTOS: &[&str] = &[
    "https://images.unsplash.com/photo-1506744038136-46273834b3fb?w=1920&h=1080&fit=crop&auto=format",
    "https://images.unsplash.com/photo-1519681393784-d120267933ba?w=1920&h=1080&fit=crop&auto=format",
    "https://images.unsplash.com/photo-1501785888041-af3ef285b470?w=1920&h=1080&fit=crop&auto=format",
    "https://images.unsplash.com/photo-1439066615861-d1af74d74000?w=1920&h=1080&fit=crop&auto=format",
];
const DEMO_MUSIC: &[&str] = &[
    "https://assets.mixkit.co/music/preview/mixkit-tech-house-vibes-130.mp3",
    "https://assets.mixkit.co/music/preview/mixkit-driving-ambition-32.mp3",
];

/// Ordered photo and track references, fixed for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLists {
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub music: Vec<String>,
}

impl MediaLists {
    /// Load lists from a JSON manifest.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        let lists: MediaLists = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse manifest {:?}", path))?;
        tracing::info!(
            "Loaded manifest with {} photos, {} tracks",
            lists.photos.len(),
            lists.music.len()
        );
        Ok(lists)
    }

    /// Remote sample deck offered when no local photos were found.
    pub fn demo() -> Self {
        Self {
            photos: DEMO_PHOTOS.iter().map(|s| s.to_string()).collect(),
            music: DEMO_MUSIC.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Scan the photo and music directories.
    pub fn scan(photos_dir: &Path, music_dir: &Path) -> Self {
        Self {
            photos: scan_dir(photos_dir, IMAGE_EXTENSIONS),
            music: scan_dir(music_dir, AUDIO_EXTENSIONS),
        }
    }
}

/// Files directly inside `dir` with one of `extensions`, sorted by name.
fn scan_dir(dir: &Path, extensions: &[&str]) -> Vec<String> {
    if !dir.is_dir() {
        tracing::warn!("Media directory {:?} does not exist", dir);
        return Vec::new();
    }

    let mut found: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_string_lossy().into_owned())
        .collect();
    found.sort();

    tracing::info!("Found {} files in {:?}", found.len(), dir);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("photo-wall-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn scan_filters_by_extension_and_sorts() {
        let photos = scratch("photos");
        let music = scratch("music");
        for name in ["b.JPG", "a.png", "notes.txt", "c.webp"] {
            fs::write(photos.join(name), b"x").unwrap();
        }
        fs::create_dir(photos.join("nested.jpg")).unwrap();
        fs::write(music.join("song.MP3"), b"x").unwrap();
        fs::write(music.join("cover.jpg"), b"x").unwrap();

        let lists = MediaLists::scan(&photos, &music);
        let names: Vec<String> = lists
            .photos
            .iter()
            .map(|p| Path::new(p).file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.JPG", "c.webp"]);
        assert_eq!(lists.music.len(), 1);

        fs::remove_dir_all(photos).unwrap();
        fs::remove_dir_all(music).unwrap();
    }

    #[test]
    fn demo_deck_is_remote() {
        let demo = MediaLists::demo();
        assert_eq!(demo.photos.len(), 4);
        assert_eq!(demo.music.len(), 2);
        assert!(demo
            .photos
            .iter()
            .chain(&demo.music)
            .all(|r| r.starts_with("https://")));
    }

    #[test]
    fn missing_directories_are_empty() {
        let lists = MediaLists::scan(
            Path::new("/nonexistent/photos"),
            Path::new("/nonexistent/music"),
        );
        assert_eq!(lists, MediaLists::default());
    }

    #[test]
    fn manifest_tolerates_missing_sections() {
        let dir = scratch("manifest");
        let path = dir.join("files.json");
        fs::write(&path, r#"{"photos": ["assets/photos/a.jpg"]}"#).unwrap();

        let lists = MediaLists::from_manifest(&path).unwrap();
        assert_eq!(lists.photos, ["assets/photos/a.jpg"]);
        assert!(lists.music.is_empty());

        fs::write(&path, "not json").unwrap();
        assert!(MediaLists::from_manifest(&path).is_err());
        fs::remove_dir_all(dir).unwrap();
    }
}
