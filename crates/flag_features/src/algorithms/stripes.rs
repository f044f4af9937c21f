use image::GrayImage;
use tracing::debug;

use crate::{
    constants::stripes::{MAX_BAND_TRANSITIONS, MIN_BAND_TRANSITIONS},
    types::{RasterImage, StripeProfile},
};

/// Stripe and band detection from mean-intensity profiles.
///
/// Each axis is reduced to one mean intensity per row (or column). Jumps in
/// that profile larger than one standard deviation of all jumps count as
/// transitions: 2–4 transitions are bands, more are stripes.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    pub min_band_transitions: usize,
    pub max_band_transitions: usize,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self {
            min_band_transitions: MIN_BAND_TRANSITIONS,
            max_band_transitions: MAX_BAND_TRANSITIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Rows,
    Columns,
}

impl PatternDetector {
    pub fn detect_stripes(&self, image: &RasterImage) -> StripeProfile {
        let gray = image.gray();
        let horizontal = count_transitions(&intensity_profile(gray, Axis::Rows));
        let vertical = count_transitions(&intensity_profile(gray, Axis::Columns));
        debug!("Intensity transitions: {} horizontal, {} vertical", horizontal, vertical);

        StripeProfile {
            has_horizontal_stripes: self.is_stripes(horizontal),
            has_vertical_stripes: self.is_stripes(vertical),
            has_horizontal_bands: self.is_bands(horizontal),
            has_vertical_bands: self.is_bands(vertical),
            horizontal_transition_count: horizontal,
            vertical_transition_count: vertical,
        }
    }

    fn is_bands(&self, transitions: usize) -> bool {
        (self.min_band_transitions..=self.max_band_transitions).contains(&transitions)
    }

    fn is_stripes(&self, transitions: usize) -> bool {
        transitions > self.max_band_transitions
    }
}

/// Mean intensity of each row (`Axis::Rows`) or column (`Axis::Columns`)
fn intensity_profile(gray: &GrayImage, axis: Axis) -> Vec<f64> {
    let (width, height) = gray.dimensions();
    let (len, span) = match axis {
        Axis::Rows => (height, width),
        Axis::Columns => (width, height),
    };
    if span == 0 {
        return Vec::new();
    }

    let mut sums = vec![0u64; len as usize];
    for (x, y, pixel) in gray.enumerate_pixels() {
        let index = match axis {
            Axis::Rows => y,
            Axis::Columns => x,
        };
        sums[index as usize] += pixel[0] as u64;
    }

    sums.into_iter().map(|s| s as f64 / span as f64).collect()
}

/// Number of absolute first differences strictly above their population
/// standard deviation
fn count_transitions(profile: &[f64]) -> usize {
    if profile.len() < 2 {
        return 0;
    }

    let diffs: Vec<f64> = profile.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / diffs.len() as f64;
    let std_dev = variance.sqrt();

    diffs.iter().filter(|&&d| d > std_dev).count()
}
