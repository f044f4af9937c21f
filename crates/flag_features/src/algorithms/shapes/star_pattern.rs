use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{otsu_level, threshold};
use tracing::debug;

use super::geometry::{arc_length, contour_area};
use crate::{
    config::ShapeConfig,
    error::Result,
    traits::ShapePass,
    types::{RasterImage, ShapeCounts},
};

/// Small star-like blobs in the places flags usually put them.
///
/// Each probe region is binarised with its own Otsu level; blobs of moderate
/// size whose compactness 4πA/P² falls strictly inside the configured range
/// are counted. Circles score near 1 and slivers near 0, stars in between.
#[derive(Debug, Clone)]
pub struct StarPatternPass {
    pub min_area: f64,
    pub max_area: f64,
    pub min_compactness: f64,
    pub max_compactness: f64,
    pub max_stars: u32,
}

impl Default for StarPatternPass {
    fn default() -> Self {
        Self::new(&ShapeConfig::default())
    }
}

/// Probe regions as (x1, y1, x2, y2): top-left third (canton), centre third,
/// left-middle band
pub fn probe_regions(width: u32, height: u32) -> [(u32, u32, u32, u32); 3] {
    [
        (0, 0, width / 3, height / 3),
        (width / 3, height / 3, 2 * width / 3, 2 * height / 3),
        (0, height / 3, width / 2, 2 * height / 3),
    ]
}

impl StarPatternPass {
    pub fn new(config: &ShapeConfig) -> Self {
        Self {
            min_area: config.star_min_area,
            max_area: config.star_max_area,
            min_compactness: config.star_min_compactness,
            max_compactness: config.star_max_compactness,
            max_stars: config.max_heuristic_stars,
        }
    }

    fn count_in_region(&self, region: &GrayImage) -> u32 {
        let binary = threshold(region, otsu_level(region));
        let mut stars = 0;
        for contour in find_contours::<i32>(&binary)
            .iter()
            .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        {
            let area = contour_area(&contour.points);
            if area <= self.min_area || area >= self.max_area {
                continue;
            }
            let perimeter = arc_length(&contour.points);
            if perimeter <= 0.0 {
                continue;
            }
            let compactness = 4.0 * std::f64::consts::PI * area / (perimeter * perimeter);
            if compactness > self.min_compactness && compactness < self.max_compactness {
                stars += 1;
            }
        }
        stars
    }
}

impl ShapePass for StarPatternPass {
    fn name(&self) -> &'static str {
        "star_pattern"
    }

    fn detect(&self, image: &RasterImage) -> Result<ShapeCounts> {
        let gray = image.gray();
        let mut stars = 0;
        for (x1, y1, x2, y2) in probe_regions(gray.width(), gray.height()) {
            if x2 <= x1 || y2 <= y1 {
                continue;
            }
            let region = image::imageops::crop_imm(gray, x1, y1, x2 - x1, y2 - y1).to_image();
            stars += self.count_in_region(&region);
        }

        let capped = stars.min(self.max_stars);
        debug!("Star pattern pass: {} candidates, {} counted", stars, capped);
        Ok(ShapeCounts::stars(capped))
    }
}
