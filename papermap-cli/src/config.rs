//! Configuration handling for the papermap CLI
//!
//! Supports loading configuration from papermap.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use papermap_core::{DepthSpec, GenerateOptions, LabelZoneRenderer, LABEL_DEPTHS, TILE_DEPTHS};
use papermap_raster::{ColourScheme, Colouring, Palette, Rgb, TileFormat, TileOptions, TileRenderer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub tiles: TilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory that receives zones/ and tiles/
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Upper bound on worker threads; 0 uses every core
    #[serde(default)]
    pub max_workers: usize,

    /// World units added around the marker bounding box
    #[serde(default)]
    pub padding: i64,

    /// Only write manifests
    #[serde(default)]
    pub skip_cells: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default)]
    pub skip: bool,

    /// Labels need a radius above this fraction of the zone scale
    #[serde(default = "default_min_radius_fraction")]
    pub min_radius_fraction: f64,

    #[serde(default = "default_label_depths")]
    pub depths: Vec<DepthSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesConfig {
    #[serde(default)]
    pub skip: bool,

    /// Tile edge length in pixels
    #[serde(default = "default_pixel_size")]
    pub pixel_size: u32,

    #[serde(default)]
    pub format: TileFormat,

    /// Write grayscale tiles to tiles-bw/
    #[serde(default)]
    pub grayscale: bool,

    #[serde(default)]
    pub draw_outline: bool,

    /// Halo radius as a multiple of marker radius
    #[serde(default = "default_halo_scale")]
    pub halo_scale: f64,

    /// RGBA fill behind the markers
    #[serde(default)]
    pub background: [u8; 4],

    #[serde(default)]
    pub colour_scheme: ColourScheme,

    /// JSON palette: [{"cat": "...", "col": [r, g, b]}]
    #[serde(default)]
    pub categories_file: Option<PathBuf>,

    /// Edge length of the `single` overview image
    #[serde(default = "default_overview_size")]
    pub overview_size: u32,

    #[serde(default = "default_tile_depths")]
    pub depths: Vec<DepthSpec>,

    #[serde(default)]
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "default_cold")]
    pub cold: Rgb,

    #[serde(default = "default_warm")]
    pub warm: Rgb,
}

// Default value functions
fn default_output_root() -> PathBuf { PathBuf::from("out") }
fn default_min_radius_fraction() -> f64 { papermap_core::zones::DEFAULT_MIN_RADIUS_FRACTION }
fn default_label_depths() -> Vec<DepthSpec> { LABEL_DEPTHS.to_vec() }
fn default_pixel_size() -> u32 { 256 }
fn default_halo_scale() -> f64 { 1.5 }
fn default_overview_size() -> u32 { 2048 }
fn default_tile_depths() -> Vec<DepthSpec> { TILE_DEPTHS.to_vec() }
fn default_cold() -> Rgb { Rgb(0.0, 0.0, 1.0) }
fn default_warm() -> Rgb { Rgb(1.0, 0.0, 0.0) }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            max_workers: 0,
            padding: 0,
            skip_cells: false,
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            skip: false,
            min_radius_fraction: default_min_radius_fraction(),
            depths: default_label_depths(),
        }
    }
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            skip: false,
            pixel_size: default_pixel_size(),
            format: TileFormat::Png,
            grayscale: false,
            draw_outline: false,
            halo_scale: default_halo_scale(),
            background: [0, 0, 0, 0],
            colour_scheme: ColourScheme::Category,
            categories_file: None,
            overview_size: default_overview_size(),
            depths: default_tile_depths(),
            heatmap: HeatmapConfig::default(),
        }
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            cold: default_cold(),
            warm: default_warm(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find papermap.toml in current directory
                let default_path = PathBuf::from("papermap.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: papermap.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).map_err(CliError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> CliResult<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.labels.min_radius_fraction < 0.0 {
            return Err(CliError::validation("labels.min_radius_fraction must not be negative"));
        }
        if self.tiles.pixel_size == 0 || self.tiles.overview_size == 0 {
            return Err(CliError::validation("tiles.pixel_size and tiles.overview_size must be positive"));
        }
        if self.tiles.halo_scale < 0.0 {
            return Err(CliError::validation("tiles.halo_scale must not be negative"));
        }
        for (section, depths) in [("labels", &self.labels.depths), ("tiles", &self.tiles.depths)] {
            if depths.is_empty() {
                return Err(CliError::validation(format!("{}.depths must not be empty", section)));
            }
            if let Some(pos) = depths.iter().position(|d| d.cells == 0 || d.scale == 0) {
                return Err(CliError::validation(format!(
                    "{}.depths[{}] has a zero cells or scale value",
                    section, pos
                )));
            }
        }
        Ok(())
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            output_root: self.general.output_root.clone(),
            max_workers: self.general.max_workers,
            padding: self.general.padding,
            skip_cells: self.general.skip_cells,
        }
    }

    pub fn label_renderer(&self) -> LabelZoneRenderer {
        LabelZoneRenderer::new(self.labels.min_radius_fraction)
    }

    /// Build the tile renderer, loading the category palette if one is set.
    pub fn tile_renderer(&self) -> Result<TileRenderer> {
        let palette = match &self.tiles.categories_file {
            Some(path) => Palette::load(path)
                .with_context(|| format!("Failed to load category palette: {}", path.display()))?,
            None => Palette::default(),
        };
        let options = TileOptions {
            pixel_size: self.tiles.pixel_size,
            format: self.tiles.format,
            draw_outline: self.tiles.draw_outline,
            halo_scale: self.tiles.halo_scale,
            background: self.tiles.background,
        };
        let colouring = Colouring {
            scheme: self.tiles.colour_scheme,
            palette,
            cold: self.tiles.heatmap.cold,
            warm: self.tiles.heatmap.warm,
            grayscale: self.tiles.grayscale,
        };
        Ok(TileRenderer::new(options, colouring))
    }
}
