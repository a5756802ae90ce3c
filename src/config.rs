//! Configuration system for Folio
//!
//! Loads configuration from TOML file at `~/.config/folio/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::shared::WindowKind;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub windows: WindowConfig,
    pub drag: DragConfig,
    pub focus: FocusConfig,
    pub persistence: PersistenceConfig,
    pub arrangement: ArrangementConfig,
    pub interaction: InteractionConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("folio");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Canvas configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in canvas units
    pub width: f64,
    /// Canvas height in canvas units
    pub height: f64,
    /// Padding used by fit-to-view
    pub fit_padding: f64,
    /// Scale step for keyboard zoom
    pub zoom_step: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 5000.0,
            height: 5000.0,
            fit_padding: 100.0,
            zoom_step: 0.1,
        }
    }
}

/// Window sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Fraction of the viewport a maximized window may take
    pub maximize_fraction: f64,
    /// Hard ceiling for width (maximize and resize)
    pub max_width: f64,
    /// Hard ceiling for height (maximize and resize)
    pub max_height: f64,
    /// Resize floor for width
    pub min_width: f64,
    /// Resize floor for height
    pub min_height: f64,
    /// Duration of the maximize transition in milliseconds
    pub maximize_transition_ms: u64,
    /// Default size for outline and codex windows
    pub panel_size: [f64; 2],
    /// Default size for codex entry windows
    pub entry_size: [f64; 2],
    /// Default size for chapter windows
    pub chapter_size: [f64; 2],
    /// Default origin for new windows
    pub default_origin: [f64; 2],
}

impl WindowConfig {
    pub fn default_size(&self, kind: WindowKind) -> [f64; 2] {
        match kind {
            WindowKind::Outline | WindowKind::Codex => self.panel_size,
            WindowKind::CodexEntry => self.entry_size,
            WindowKind::Chapter | WindowKind::Custom => self.chapter_size,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            maximize_fraction: 0.9,
            max_width: 1600.0,
            max_height: 1200.0,
            min_width: 200.0,
            min_height: 120.0,
            maximize_transition_ms: 300,
            panel_size: [500.0, 600.0],
            entry_size: [400.0, 500.0],
            chapter_size: [600.0, 700.0],
            default_origin: [100.0, 100.0],
        }
    }
}

/// Drag and auto-pan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Distance from a viewport edge that triggers auto-pan
    pub edge_margin: f64,
    /// Pan distance per frame
    pub pan_step: f64,
    /// Frame interval of the auto-pan loop in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            edge_margin: 50.0,
            pan_step: 10.0,
            frame_interval_ms: 16,
        }
    }
}

/// Scroll-into-view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Minimum distance kept between a focused window and the viewport edge
    pub scroll_padding: f64,
    /// Pan deltas at or below this are ignored
    pub scroll_tolerance: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            scroll_padding: 25.0,
            scroll_tolerance: 15.0,
        }
    }
}

/// Layout persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Quiet period before a layout write, in milliseconds
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { debounce_ms: 1000 }
    }
}

/// Arrangement grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangementConfig {
    pub origin: [f64; 2],
    pub gap: f64,
    pub codex_size: [f64; 2],
    pub entry_size: [f64; 2],
    pub outline_size: [f64; 2],
    pub chapter_size: [f64; 2],
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            origin: [50.0, 50.0],
            gap: 40.0,
            codex_size: [500.0, 700.0],
            entry_size: [400.0, 320.0],
            outline_size: [500.0, 700.0],
            chapter_size: [600.0, 400.0],
        }
    }
}

/// Pointer interaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Class names of interactive children that swallow double-clicks
    pub double_click_denylist: Vec<String>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            double_click_denylist: [
                "window-controls",
                "window-button",
                "resize-handle",
                "editor-content",
                "codex-entry-link",
                "outline-item",
                "button",
                "input",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
