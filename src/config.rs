// src/config.rs

//! Defines the configuration structures for `core-paint`.
//!
//! Settings are grouped into canvas, server, and display sections. Every
//! section has defaults, so a configuration file only needs the fields it
//! changes. The file is JSON and is located through the `CORE_PAINT_CONFIG`
//! environment variable; without it the defaults are used.

use crate::lang::{Palette, DEFAULT_COORDINATE_SCALE};
use crate::painter::Size;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "CORE_PAINT_CONFIG";

/// Process-wide configuration, loaded on first access.
///
/// A file that fails to load is reported and replaced by the defaults.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(config) => config,
    Err(e) => {
        warn!("Failed to load configuration, using defaults: {:#}", e);
        Config::default()
    }
});

// --- Top-Level Configuration Structure ---

/// Represents the complete configuration of the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Canvas dimensions and command coordinate scaling.
    pub canvas: CanvasConfig,
    /// HTTP command endpoint.
    pub server: ServerConfig,
    /// Headless presentation settings.
    pub display: DisplayConfig,
}

impl Config {
    /// Loads from the file named by `CORE_PAINT_CONFIG`, or returns defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                info!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    /// Loads and parses a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// --- Canvas Configuration ---

/// Defines the drawing surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Factor applied to fractional command coordinates.
    pub coordinate_scale: f64,
    /// Colors used by the drawing commands.
    pub palette: Palette,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasConfig {
            width: 800,
            height: 800,
            coordinate_scale: DEFAULT_COORDINATE_SCALE,
            palette: Palette::default(),
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

// --- Server Configuration ---

/// Defines where the command endpoint listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:17000".
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:17000".to_string(),
        }
    }
}

// --- Display Configuration ---

/// Defines how published frames are presented.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// When set, every published frame is written here as a PNG.
    pub snapshot_path: Option<PathBuf>,
}
