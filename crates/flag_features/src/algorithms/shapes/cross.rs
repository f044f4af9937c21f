use std::collections::VecDeque;

use image::GrayImage;
use tracing::debug;

use crate::{
    config::ShapeConfig,
    constants::shapes::{CROSS_KERNEL_DIVISOR, CROSS_KERNEL_THICKNESS},
    error::Result,
    traits::ShapePass,
    types::{RasterImage, ShapeCounts},
};

/// Crossing long horizontal and vertical bars.
///
/// The grayscale image is opened with a wide flat element and with a tall
/// one; where both openings stay bright there is a horizontal bar crossing a
/// vertical one. A large enough bright overlap counts as one cross.
#[derive(Debug, Clone)]
pub struct CrossPass {
    pub intensity: u8,
    pub min_overlap: f64,
}

impl Default for CrossPass {
    fn default() -> Self {
        Self::new(&ShapeConfig::default())
    }
}

impl CrossPass {
    pub fn new(config: &ShapeConfig) -> Self {
        Self {
            intensity: config.cross_intensity,
            min_overlap: config.cross_min_overlap,
        }
    }
}

impl ShapePass for CrossPass {
    fn name(&self) -> &'static str {
        "cross"
    }

    fn detect(&self, image: &RasterImage) -> Result<ShapeCounts> {
        let gray = image.gray();
        let (width, height) = gray.dimensions();
        let bar_width = width / CROSS_KERNEL_DIVISOR;
        let bar_height = height / CROSS_KERNEL_DIVISOR;
        if bar_width == 0 || bar_height == 0 {
            return Ok(ShapeCounts::default());
        }

        // A featureless image opens to itself and would always "overlap"
        let (min, max) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        if min == max {
            return Ok(ShapeCounts::default());
        }

        let horizontal = open_rect(gray, bar_width, CROSS_KERNEL_THICKNESS);
        let vertical = open_rect(gray, CROSS_KERNEL_THICKNESS, bar_height);

        let overlap = horizontal
            .pixels()
            .zip(vertical.pixels())
            .filter(|(h, v)| (h[0] & v[0]) > self.intensity)
            .count();

        let area = width as f64 * height as f64;
        let crosses = u32::from(overlap as f64 >= area * self.min_overlap);
        debug!(
            "Cross pass: {} overlap pixels ({:.2}% of image), {} cross",
            overlap,
            overlap as f64 / area * 100.0,
            crosses
        );
        Ok(ShapeCounts::crosses(crosses))
    }
}

/// Grayscale opening (erosion then dilation) with a flat `kw` x `kh` rectangle
pub fn open_rect(image: &GrayImage, kw: u32, kh: u32) -> GrayImage {
    let eroded = rect_filter(image, kw, kh, Extreme::Min);
    rect_filter(&eroded, kw, kh, Extreme::Max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

/// Separable min/max filter over a `kw` x `kh` window anchored at its centre.
/// Windows are clipped at the image border.
fn rect_filter(image: &GrayImage, kw: u32, kh: u32, extreme: Extreme) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut rows = GrayImage::new(width, height);
    let mut line = Vec::with_capacity(width.max(height) as usize);

    for y in 0..height {
        line.clear();
        line.extend((0..width).map(|x| image.get_pixel(x, y)[0]));
        for (x, value) in sliding_extreme(&line, kw as usize, extreme).into_iter().enumerate() {
            rows.get_pixel_mut(x as u32, y)[0] = value;
        }
    }

    let mut out = GrayImage::new(width, height);
    for x in 0..width {
        line.clear();
        line.extend((0..height).map(|y| rows.get_pixel(x, y)[0]));
        for (y, value) in sliding_extreme(&line, kh as usize, extreme).into_iter().enumerate() {
            out.get_pixel_mut(x, y as u32)[0] = value;
        }
    }
    out
}

/// Running min or max over a window of `k` samples, `k / 2` of them before
/// the current one, using a monotonic deque
fn sliding_extreme(line: &[u8], k: usize, extreme: Extreme) -> Vec<u8> {
    let n = line.len();
    if n == 0 || k <= 1 {
        return line.to_vec();
    }

    let anchor = k / 2;
    let dominates = |a: u8, b: u8| match extreme {
        Extreme::Min => a <= b,
        Extreme::Max => a >= b,
    };

    let mut out = Vec::with_capacity(n);
    let mut window: VecDeque<usize> = VecDeque::new();
    let mut next = 0;
    for i in 0..n {
        let lo = i.saturating_sub(anchor);
        let hi = (i + k - 1 - anchor).min(n - 1);
        while next <= hi {
            while let Some(&back) = window.back() {
                if dominates(line[next], line[back]) {
                    window.pop_back();
                } else {
                    break;
                }
            }
            window.push_back(next);
            next += 1;
        }
        while let Some(&front) = window.front() {
            if front < lo {
                window.pop_front();
            } else {
                break;
            }
        }
        if let Some(&front) = window.front() {
            out.push(line[front]);
        }
    }
    out
}
