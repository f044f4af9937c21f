use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, AddAssign};

use image::{GrayImage, RgbImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{FlagError, Result};

/// Channel layout of the colour view held by a [`RasterImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelOrder {
    Rgb,
}

/// A decoded flag bitmap with its colour and grayscale views.
///
/// Built once per analysis and dropped with it; nothing downstream keeps it.
#[derive(Debug, Clone)]
pub struct RasterImage {
    rgb: RgbImage,
    gray: GrayImage,
}

impl RasterImage {
    /// Decode raw file bytes. Any format the `image` crate recognises is accepted.
    pub fn from_bytes(bytes: &[u8], identifier: &str) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|source| FlagError::ImageDecode {
            identifier: identifier.to_string(),
            source,
        })?;
        Ok(Self::from_rgb(decoded.to_rgb8()))
    }

    pub fn from_rgb(rgb: RgbImage) -> Self {
        let gray = image::imageops::grayscale(&rgb);
        Self { rgb, gray }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    pub fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Copy out a sub-region, clamped to the image bounds. The result may be empty.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> RasterImage {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);
        let rgb = image::imageops::crop_imm(&self.rgb, x, y, width, height).to_image();
        let gray = image::imageops::crop_imm(&self.gray, x, y, width, height).to_image();
        RasterImage { rgb, gray }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DominantColor {
    pub rgb: [u8; 3],
    pub hex: String,
    /// Colour category (or exact CSS name) from the colour namer
    pub name: String,
    /// Share of the sampled pixels, 0–100, two decimals
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StripeProfile {
    pub has_horizontal_stripes: bool,
    pub has_vertical_stripes: bool,
    pub has_horizontal_bands: bool,
    pub has_vertical_bands: bool,
    pub horizontal_transition_count: usize,
    pub vertical_transition_count: usize,
}

impl StripeProfile {
    pub fn has_stripes(&self) -> bool {
        self.has_horizontal_stripes || self.has_vertical_stripes
    }

    pub fn has_bands(&self) -> bool {
        self.has_horizontal_bands || self.has_vertical_bands
    }
}

/// Shape tallies. `total_shapes` is kept equal to the sum of the other five;
/// use [`ShapeCounts::new`] or addition rather than writing fields directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShapeCounts {
    pub circles: u32,
    pub triangles: u32,
    pub rectangles: u32,
    pub stars: u32,
    pub crosses: u32,
    pub total_shapes: u32,
}

impl ShapeCounts {
    pub fn new(circles: u32, triangles: u32, rectangles: u32, stars: u32, crosses: u32) -> Self {
        Self {
            circles,
            triangles,
            rectangles,
            stars,
            crosses,
            total_shapes: circles + triangles + rectangles + stars + crosses,
        }
    }

    pub fn stars(stars: u32) -> Self {
        Self::new(0, 0, 0, stars, 0)
    }

    pub fn crosses(crosses: u32) -> Self {
        Self::new(0, 0, 0, 0, crosses)
    }

    pub fn total(&self) -> u32 {
        self.circles + self.triangles + self.rectangles + self.stars + self.crosses
    }
}

impl Add for ShapeCounts {
    type Output = ShapeCounts;

    fn add(self, rhs: ShapeCounts) -> ShapeCounts {
        ShapeCounts::new(
            self.circles + rhs.circles,
            self.triangles + rhs.triangles,
            self.rectangles + rhs.rectangles,
            self.stars + rhs.stars,
            self.crosses + rhs.crosses,
        )
    }
}

impl AddAssign for ShapeCounts {
    fn add_assign(&mut self, rhs: ShapeCounts) {
        *self = *self + rhs;
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutDescriptor {
    /// width / height, rounded to two decimals
    pub aspect_ratio: f64,
    pub width: u32,
    pub height: u32,
    pub region_colors: BTreeMap<Region, String>,
    pub is_square: bool,
    pub is_horizontal: bool,
    pub is_vertical: bool,
}

/// Externally supplied knowledge about what a flag depicts. Never computed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SymbolicAnnotation {
    pub has_human: bool,
    pub has_animal: bool,
    pub has_plant: bool,
    pub has_weapon: bool,
    pub has_building: bool,
    pub has_celestial: bool,
    pub has_union_jack: bool,
    pub has_cross: bool,
    pub has_crescent: bool,
    pub details: Vec<String>,
}

/// Everything extracted from one flag image.
///
/// Every field defaults when absent so documents written by older versions
/// (or by other tools) still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FlagFeatureRecord {
    pub identifier: String,
    pub file_path: Option<String>,
    pub dominant_colors: Vec<DominantColor>,
    /// Distinct colour names, sorted
    pub unique_colors: Vec<String>,
    pub color_count: usize,
    pub stripes: StripeProfile,
    pub shapes: ShapeCounts,
    pub layout: LayoutDescriptor,
    /// All-false when nothing is known; `None` only in older documents
    pub symbolic: Option<SymbolicAnnotation>,
    pub has_red: bool,
    pub has_blue: bool,
    pub has_green: bool,
    pub has_yellow: bool,
    pub has_white: bool,
    pub has_black: bool,
    pub is_tricolor: bool,
    pub is_bicolor: bool,
    pub complexity_score: f64,
}

impl FlagFeatureRecord {
    /// Assemble a record, deriving the colour convenience flags from `dominant_colors`.
    pub fn assemble(
        identifier: impl Into<String>,
        dominant_colors: Vec<DominantColor>,
        stripes: StripeProfile,
        shapes: ShapeCounts,
        layout: LayoutDescriptor,
        symbolic: Option<SymbolicAnnotation>,
        complexity_score: f64,
    ) -> Self {
        let unique_colors = unique_categories(&dominant_colors);
        let has = |name: &str| unique_colors.iter().any(|c| c == name);
        Self {
            identifier: identifier.into(),
            file_path: None,
            has_red: has("red"),
            has_blue: has("blue"),
            has_green: has("green"),
            has_yellow: has("yellow"),
            has_white: has("white"),
            has_black: has("black"),
            color_count: unique_colors.len(),
            is_tricolor: unique_colors.len() == 3,
            is_bicolor: unique_colors.len() == 2,
            unique_colors,
            dominant_colors,
            stripes,
            shapes,
            layout,
            symbolic,
            complexity_score,
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Symbolic flags, all false when the flag was never decorated
    pub fn symbolic_or_default(&self) -> SymbolicAnnotation {
        self.symbolic.clone().unwrap_or_default()
    }

    pub fn has_color(&self, name: &str) -> bool {
        self.unique_colors.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Distinct colour names of a dominant colour list, sorted for stable output
pub fn unique_categories(colors: &[DominantColor]) -> Vec<String> {
    colors
        .iter()
        .map(|c| c.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
