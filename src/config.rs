use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color;
use crate::layout::{self, Anchor};
use crate::render::WatermarkStyle;
use crate::text::{self, FontSizeSpec};

/// Top-level configuration for exif-datemark.
///
/// Holds the watermark defaults that command-line flags override. Missing
/// sections or fields in the JSON file take their default values.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_datemark::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.watermark.color = "yellow".into();
/// let style = config.style();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub watermark: WatermarkConfig,
    pub layout: LayoutConfig,
    pub output: OutputConfig,
}

/// What the watermark looks like and where it goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Pixels (`"24"`) or a fraction of the image width (`"0.04"`).
    pub font_size: String,
    /// `#RRGGBB` or a color name.
    pub color: String,
    /// Anchor name; unknown names mean bottom-right.
    pub position: String,
    /// TrueType/OpenType font file; empty means the embedded font.
    pub font_path: Option<String>,
}

/// Sizing constants used by the layout step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub margin: i32,
    pub min_font_px: u32,
    pub fallback_font_px: u32,
    pub max_font_px: u32,
}

/// Output naming and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub jpeg_quality: u8,
    /// Appended to the input directory name to form the output directory.
    pub dir_suffix: String,
    /// Appended to each file stem.
    pub file_suffix: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_size: "0.04".to_string(),
            color: "#FFFFFF".to_string(),
            position: Anchor::BottomRight.name().to_string(),
            font_path: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: layout::DEFAULT_MARGIN,
            min_font_px: text::MIN_PROPORTIONAL_FONT_PX,
            fallback_font_px: text::FALLBACK_FONT_PX,
            max_font_px: text::MAX_FONT_PX,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            dir_suffix: "_watermark".to_string(),
            file_suffix: "_wm".to_string(),
        }
    }
}

impl Config {
    /// Path of `config.json` next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    ///
    /// A missing file gives the defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(config_path)
    }

    /// Build the drawing style from the `watermark` and `layout` sections.
    pub fn style(&self) -> WatermarkStyle {
        WatermarkStyle {
            font_size: FontSizeSpec::parse(&self.watermark.font_size),
            color: color::parse_color(&self.watermark.color),
            anchor: Anchor::from_name(&self.watermark.position),
            font_path: self
                .watermark
                .font_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            margin: self.layout.margin,
            min_font_px: self.layout.min_font_px,
            fallback_font_px: self.layout.fallback_font_px,
            max_font_px: self.layout.max_font_px,
        }
    }
}
