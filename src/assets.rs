//! Keyed asset loading and caching
//!
//! Assets are referenced by string keys. The manifest maps keys to paths, an
//! [`AssetSource`] resolves paths to bytes, and the [`AssetCache`] keeps the
//! decoded metadata for the life of the process so restarts never reload.
//! Only image headers are decoded: the simulation needs sizes and frame
//! grids, not pixels.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DUDE_FRAME_HEIGHT, DUDE_FRAME_WIDTH};

/// Fatal asset failures. Any of these aborts startup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{key}` could not be resolved at `{path}`")]
    Unresolvable {
        key: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("asset `{key}` is not a decodable image")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "spritesheet `{key}` is {width}x{height}, too small for {frame_width}x{frame_height} frames"
    )]
    BadSpriteSheet {
        key: String,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
    #[error("spritesheet `{key}` has {available} frames but frame {frame} is required")]
    MissingFrame {
        key: String,
        frame: u32,
        available: u32,
    },
    #[error("asset `{0}` has not been loaded")]
    NotLoaded(String),
}

/// Resolves asset paths to raw bytes
pub trait AssetSource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>>;
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsSource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// In-memory assets (prefetched on the web, synthesized in tests)
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no asset at {path}"))
        })
    }
}

/// A static image entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub key: String,
    pub path: String,
}

/// A spritesheet entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSheetDescriptor {
    pub key: String,
    pub path: String,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Key → path mapping for everything the scene loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub images: Vec<ImageDescriptor>,
    #[serde(default)]
    pub spritesheets: Vec<SpriteSheetDescriptor>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        let image = |key: &str, path: &str| ImageDescriptor {
            key: key.to_string(),
            path: path.to_string(),
        };
        Self {
            images: vec![
                image("sky", "assets/sky.png"),
                image("ground", "assets/platform.png"),
                image("star", "assets/star.png"),
                image("bomb", "assets/bomb.png"),
            ],
            spritesheets: vec![SpriteSheetDescriptor {
                key: "dude".to_string(),
                path: "assets/dude.png".to_string(),
                frame_width: DUDE_FRAME_WIDTH,
                frame_height: DUDE_FRAME_HEIGHT,
            }],
        }
    }
}

impl AssetManifest {
    /// Every path the manifest references, images first
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .map(|i| i.path.as_str())
            .chain(self.spritesheets.iter().map(|s| s.path.as_str()))
    }
}

/// Decoded image metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
}

/// Decoded spritesheet metadata (frames laid out left-to-right, top-to-bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSheet {
    pub width: u32,
    pub height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl SpriteSheet {
    pub fn columns(&self) -> u32 {
        self.width / self.frame_width
    }

    pub fn rows(&self) -> u32 {
        self.height / self.frame_height
    }

    pub fn frame_count(&self) -> u32 {
        self.columns() * self.rows()
    }
}

/// Process-lifetime cache of loaded assets
#[derive(Debug, Default)]
pub struct AssetCache {
    images: HashMap<String, ImageAsset>,
    sheets: HashMap<String, SpriteSheet>,
    /// Number of actual reads from a source
    loads: usize,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load everything in the manifest, skipping keys already cached
    pub fn load_manifest(
        &mut self,
        manifest: &AssetManifest,
        source: &dyn AssetSource,
    ) -> Result<(), AssetError> {
        for desc in &manifest.images {
            self.load_image(&desc.key, &desc.path, source)?;
        }
        for desc in &manifest.spritesheets {
            self.load_spritesheet(
                &desc.key,
                &desc.path,
                desc.frame_width,
                desc.frame_height,
                source,
            )?;
        }
        Ok(())
    }

    pub fn load_image(
        &mut self,
        key: &str,
        path: &str,
        source: &dyn AssetSource,
    ) -> Result<ImageAsset, AssetError> {
        if let Some(image) = self.images.get(key) {
            return Ok(*image);
        }
        let (width, height) = self.read_dimensions(key, path, source)?;
        let image = ImageAsset { width, height };
        log::debug!("Loaded image `{}` ({}x{}) from {}", key, width, height, path);
        self.images.insert(key.to_string(), image);
        Ok(image)
    }

    pub fn load_spritesheet(
        &mut self,
        key: &str,
        path: &str,
        frame_width: u32,
        frame_height: u32,
        source: &dyn AssetSource,
    ) -> Result<SpriteSheet, AssetError> {
        if let Some(sheet) = self.sheets.get(key) {
            return Ok(*sheet);
        }
        let (width, height) = self.read_dimensions(key, path, source)?;
        if frame_width == 0 || frame_height == 0 || width < frame_width || height < frame_height
        {
            return Err(AssetError::BadSpriteSheet {
                key: key.to_string(),
                width,
                height,
                frame_width,
                frame_height,
            });
        }
        let sheet = SpriteSheet {
            width,
            height,
            frame_width,
            frame_height,
        };
        log::debug!(
            "Loaded spritesheet `{}` ({} frames of {}x{}) from {}",
            key,
            sheet.frame_count(),
            frame_width,
            frame_height,
            path
        );
        self.sheets.insert(key.to_string(), sheet);
        Ok(sheet)
    }

    pub fn image(&self, key: &str) -> Result<ImageAsset, AssetError> {
        self.images
            .get(key)
            .copied()
            .ok_or_else(|| AssetError::NotLoaded(key.to_string()))
    }

    pub fn spritesheet(&self, key: &str) -> Result<SpriteSheet, AssetError> {
        self.sheets
            .get(key)
            .copied()
            .ok_or_else(|| AssetError::NotLoaded(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.images.contains_key(key) || self.sheets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many times a source was actually read
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn read_dimensions(
        &mut self,
        key: &str,
        path: &str,
        source: &dyn AssetSource,
    ) -> Result<(u32, u32), AssetError> {
        let bytes = source.read(path).map_err(|source| AssetError::Unresolvable {
            key: key.to_string(),
            path: path.to_string(),
            source,
        })?;
        self.loads += 1;

        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .and_then(|reader| reader.into_dimensions())
            .map_err(|source| AssetError::Decode {
                key: key.to_string(),
                source,
            })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_load_standard_manifest() {
        let mut cache = AssetCache::new();
        cache
            .load_manifest(&AssetManifest::default(), &standard_source())
            .unwrap();

        assert_eq!(cache.len(), 5);
        assert_eq!(
            cache.image("ground").unwrap(),
            ImageAsset {
                width: 400,
                height: 32
            }
        );
        let dude = cache.spritesheet("dude").unwrap();
        assert_eq!(dude.frame_count(), 9);
        assert_eq!(dude.columns(), 9);
    }

    #[test]
    fn test_cached_keys_are_not_reloaded() {
        let mut cache = AssetCache::new();
        let source = standard_source();
        let manifest = AssetManifest::default();

        cache.load_manifest(&manifest, &source).unwrap();
        assert_eq!(cache.load_count(), 5);

        cache.load_manifest(&manifest, &source).unwrap();
        assert_eq!(cache.load_count(), 5);
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let mut cache = AssetCache::new();
        let mut source = standard_source();
        source.files.remove("assets/bomb.png");

        let err = cache
            .load_manifest(&AssetManifest::default(), &source)
            .unwrap_err();
        match err {
            AssetError::Unresolvable { key, path, .. } => {
                assert_eq!(key, "bomb");
                assert_eq!(path, "assets/bomb.png");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_corrupt_image_is_fatal() {
        let mut cache = AssetCache::new();
        let mut source = MemorySource::new();
        source.insert("star.png", b"definitely not a png".to_vec());

        let err = cache.load_image("star", "star.png", &source).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        assert!(!cache.contains("star"));
    }

    #[test]
    fn test_spritesheet_smaller_than_frame() {
        let mut cache = AssetCache::new();
        let mut source = MemorySource::new();
        source.insert("tiny.png", png(16, 16));

        let err = cache
            .load_spritesheet("dude", "tiny.png", 32, 48, &source)
            .unwrap_err();
        assert!(matches!(err, AssetError::BadSpriteSheet { .. }));
    }

    #[test]
    fn test_lookup_before_load() {
        let cache = AssetCache::new();
        assert!(matches!(cache.image("sky"), Err(AssetError::NotLoaded(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_manifest_json_roundtrip_defaults_spritesheets() {
        let json = r#"{ "images": [ { "key": "sky", "path": "sky.png" } ] }"#;
        let manifest: AssetManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.images.len(), 1);
        assert!(manifest.spritesheets.is_empty());
        assert_eq!(manifest.paths().collect::<Vec<_>>(), vec!["sky.png"]);
    }
}
