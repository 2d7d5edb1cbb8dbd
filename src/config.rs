//! Host configuration
//!
//! Canvas size, gravity, physics debug drawing, the element to mount into,
//! and where the assets live. Loaded once at startup; anything unreadable
//! falls back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetManifest;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, GRAVITY};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the host hands to the engine at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Canvas width (world units = pixels)
    pub width: f32,
    /// Canvas height
    pub height: f32,
    /// Downward gravity (pixels/s²)
    pub gravity: f32,
    /// Draw physics body outlines
    pub debug: bool,
    /// Id of the canvas element to render into
    pub parent: String,
    /// Asset keys and paths
    pub assets: AssetManifest,
    /// Fixed RNG seed (random per run when unset)
    pub seed: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            gravity: GRAVITY,
            debug: false,
            parent: "canvas".to_string(),
            assets: AssetManifest::default(),
            seed: None,
        }
    }
}

impl HostConfig {
    /// Environment variable naming a config file (native)
    pub const ENV_VAR: &'static str = "STAR_CATCHER_CONFIG";
    /// Config file picked up from the working directory when present (native)
    pub const DEFAULT_FILE: &'static str = "star-catcher.json";
    /// LocalStorage key (wasm)
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "star_catcher_config";

    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }
        if self.assets.images.is_empty() {
            return Err(ConfigError::Invalid("asset manifest is empty".to_string()));
        }
        Ok(())
    }

    /// Read a config file from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `$STAR_CATCHER_CONFIG`, else `./star-catcher.json`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let path = match std::env::var(Self::ENV_VAR) {
            Ok(path) => path,
            Err(_) if std::path::Path::new(Self::DEFAULT_FILE).exists() => {
                Self::DEFAULT_FILE.to_string()
            }
            Err(_) => {
                log::info!("Using default config");
                return Self::default();
            }
        };

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Load from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from LocalStorage");
                    return config;
                }
                Err(e) => log::warn!("Ignoring stored config: {}", e),
            }
        }

        log::info!("Using default config");
        Self::default()
    }
}
