use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    algorithms::clustering::{round2, ColorClusterer},
    config::AnalysisConfig,
    constants::layout::{HORIZONTAL_MIN_ASPECT, SQUARE_TOLERANCE, VERTICAL_MAX_ASPECT},
    types::{LayoutDescriptor, RasterImage, Region},
};

/// Label given to a region whose clustering found no colour
pub const UNKNOWN_REGION_COLOR: &str = "unknown";

/// Aspect classification and per-region dominant colours
#[derive(Debug, Clone)]
pub struct LayoutAnalyzer {
    clusterer: ColorClusterer,
}

impl Default for LayoutAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl LayoutAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            clusterer: ColorClusterer::new(&config.colors).with_k(config.layout.region_k),
        }
    }

    pub fn analyze_layout(&self, image: &RasterImage) -> LayoutDescriptor {
        let (width, height) = (image.width(), image.height());
        let aspect = if height == 0 { 0.0 } else { width as f64 / height as f64 };

        let region_colors: BTreeMap<Region, String> = region_bounds(width, height)
            .into_iter()
            .map(|(region, (x, y, w, h))| {
                let name = self
                    .clusterer
                    .extract_dominant_colors(&image.crop(x, y, w, h))
                    .into_iter()
                    .next()
                    .map(|c| c.name)
                    .unwrap_or_else(|| UNKNOWN_REGION_COLOR.to_string());
                (region, name)
            })
            .collect();

        let descriptor = LayoutDescriptor {
            aspect_ratio: round2(aspect),
            width,
            height,
            region_colors,
            is_square: (aspect - 1.0).abs() < SQUARE_TOLERANCE,
            is_horizontal: aspect > HORIZONTAL_MIN_ASPECT,
            is_vertical: height > 0 && aspect < VERTICAL_MAX_ASPECT,
        };
        debug!(
            "Layout {}x{}: aspect {:.2}, regions {:?}",
            width, height, descriptor.aspect_ratio, descriptor.region_colors
        );
        descriptor
    }
}

/// Crop rectangles (x, y, w, h) for the four quadrants and the centre.
/// The centre covers the middle half of both axes and overlaps all quadrants.
pub fn region_bounds(width: u32, height: u32) -> [(Region, (u32, u32, u32, u32)); 5] {
    let (half_w, half_h) = (width / 2, height / 2);
    let (quarter_w, quarter_h) = (width / 4, height / 4);
    [
        (Region::TopLeft, (0, 0, half_w, half_h)),
        (Region::TopRight, (half_w, 0, width - half_w, half_h)),
        (Region::BottomLeft, (0, half_h, half_w, height - half_h)),
        (Region::BottomRight, (half_w, half_h, width - half_w, height - half_h)),
        (
            Region::Center,
            (quarter_w, quarter_h, 3 * width / 4 - quarter_w, 3 * height / 4 - quarter_h),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use strum::IntoEnumIterator;

    fn quartered(width: u32, height: u32) -> RasterImage {
        let rgb = RgbImage::from_fn(width, height, |x, y| {
            match (x < width / 2, y < height / 2) {
                (true, true) => Rgb([0, 0, 255]),
                (false, true) => Rgb([255, 0, 0]),
                (true, false) => Rgb([255, 255, 255]),
                (false, false) => Rgb([0, 128, 0]),
            }
        });
        RasterImage::from_rgb(rgb)
    }

    #[test]
    fn test_region_bounds_cover_quadrants_and_centre() {
        let bounds = region_bounds(101, 60);
        assert_eq!(bounds[0].1, (0, 0, 50, 30));
        assert_eq!(bounds[1].1, (50, 0, 51, 30));
        assert_eq!(bounds[3].1, (50, 30, 51, 30));
        assert_eq!(bounds[4].1, (25, 15, 50, 30));
    }

    #[test]
    fn test_quadrant_colors() {
        let layout = LayoutAnalyzer::default().analyze_layout(&quartered(120, 80));
        assert_eq!(layout.region_colors[&Region::TopLeft], "blue");
        assert_eq!(layout.region_colors[&Region::TopRight], "red");
        assert_eq!(layout.region_colors[&Region::BottomLeft], "white");
        assert_eq!(layout.region_colors[&Region::BottomRight], "green");
        assert_eq!(layout.region_colors.len(), Region::iter().count());
    }

    #[test]
    fn test_aspect_classification() {
        let analyzer = LayoutAnalyzer::default();

        let wide = analyzer.analyze_layout(&quartered(160, 100));
        assert_eq!(wide.aspect_ratio, 1.6);
        assert!(wide.is_horizontal && !wide.is_square && !wide.is_vertical);

        let square = analyzer.analyze_layout(&quartered(100, 95));
        assert_eq!(square.aspect_ratio, 1.05);
        assert!(square.is_square && !square.is_horizontal);

        let tall = analyzer.analyze_layout(&quartered(60, 100));
        assert!(tall.is_vertical && !tall.is_square);

        // 3:2 is neither square nor strictly horizontal
        let classic = analyzer.analyze_layout(&quartered(150, 100));
        assert_eq!(classic.aspect_ratio, 1.5);
        assert!(!classic.is_horizontal && !classic.is_square && !classic.is_vertical);
    }

    #[test]
    fn test_flags_use_unrounded_ratio() {
        // 1.504 rounds to 1.5 but is still horizontal
        let layout = LayoutAnalyzer::default().analyze_layout(&quartered(188, 125));
        assert_eq!(layout.aspect_ratio, 1.5);
        assert!(layout.is_horizontal);
    }

    #[test]
    fn test_degenerate_image_regions_are_unknown() {
        let layout = LayoutAnalyzer::default().analyze_layout(&RasterImage::from_rgb(RgbImage::new(1, 1)));
        assert_eq!(layout.region_colors[&Region::TopLeft], UNKNOWN_REGION_COLOR);
        assert_eq!(layout.region_colors[&Region::Center], UNKNOWN_REGION_COLOR);
        assert_eq!(layout.region_colors[&Region::BottomRight], "black");
    }
}
