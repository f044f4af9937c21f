use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{FlagError, Result};

/// Complete tuning surface of the analysis pipeline.
///
/// Every field has a default, so a file only needs the values it overrides:
///
/// ```toml
/// [colors]
/// k = 6
///
/// [batch]
/// workers = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    pub colors: ColorConfig,
    pub layout: LayoutConfig,
    pub shapes: ShapeConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColorConfig {
    #[schemars(range(min = 1, max = 32))]
    pub k: usize,
    pub min_percentage: f64,
    pub max_pixels: u32,
    pub restarts: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            k: constants::colors::DEFAULT_CLUSTER_COUNT,
            min_percentage: constants::colors::MIN_PERCENTAGE,
            max_pixels: constants::colors::MAX_CLUSTER_PIXELS,
            restarts: constants::colors::RESTARTS,
            max_iterations: constants::colors::MAX_ITERATIONS,
            seed: constants::colors::SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutConfig {
    pub region_k: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            region_k: constants::layout::REGION_CLUSTER_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShapeConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub min_contour_area: f64,
    pub approx_epsilon_ratio: f64,
    pub circle_area_tolerance: f64,
    pub min_star_defects: usize,
    pub min_defect_depth: f64,
    pub star_min_area: f64,
    pub star_max_area: f64,
    pub star_min_compactness: f64,
    pub star_max_compactness: f64,
    pub max_heuristic_stars: u32,
    pub cross_intensity: u8,
    pub cross_min_overlap: f64,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        use constants::shapes::*;
        Self {
            canny_low: CANNY_LOW,
            canny_high: CANNY_HIGH,
            min_contour_area: MIN_CONTOUR_AREA,
            approx_epsilon_ratio: APPROX_EPSILON_RATIO,
            circle_area_tolerance: CIRCLE_AREA_TOLERANCE,
            min_star_defects: MIN_STAR_DEFECTS,
            min_defect_depth: MIN_DEFECT_DEPTH,
            star_min_area: STAR_MIN_AREA,
            star_max_area: STAR_MAX_AREA,
            star_min_compactness: STAR_MIN_COMPACTNESS,
            star_max_compactness: STAR_MAX_COMPACTNESS,
            max_heuristic_stars: MAX_HEURISTIC_STARS,
            cross_intensity: CROSS_INTENSITY,
            cross_min_overlap: CROSS_MIN_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchConfig {
    /// Dedicated worker count; `None` uses the global pool (one per core)
    pub workers: Option<usize>,
}

impl AnalysisConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FlagError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(FlagError::Config(format!(
                "unsupported configuration format for {} (use .toml or .json)",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.colors.k == 0 {
            return Err(FlagError::Config("colors.k must be at least 1".into()));
        }
        if self.layout.region_k == 0 {
            return Err(FlagError::Config("layout.region_k must be at least 1".into()));
        }
        if self.colors.restarts == 0 {
            return Err(FlagError::Config("colors.restarts must be at least 1".into()));
        }
        if !(0.0..=100.0).contains(&self.colors.min_percentage) {
            return Err(FlagError::Config(format!(
                "colors.min_percentage must be within 0..=100, got {}",
                self.colors.min_percentage
            )));
        }
        if self.batch.workers == Some(0) {
            return Err(FlagError::Config("batch.workers must be at least 1".into()));
        }
        Ok(())
    }
}
