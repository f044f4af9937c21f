use image::imageops::FilterType;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::{
    algorithms::naming::ColorNamer,
    config::ColorConfig,
    constants,
    error::{FlagError, Result},
    types::{DominantColor, RasterImage},
};

/// Dominant colour extraction by k-means over the pixel set
#[derive(Debug, Clone)]
pub struct ColorClusterer {
    pub k: usize,
    pub min_percentage: f64,
    pub max_pixels: u32,
    pub restarts: usize,
    pub max_iterations: usize,
    pub seed: u64,
    namer: ColorNamer,
}

impl Default for ColorClusterer {
    fn default() -> Self {
        Self::new(&ColorConfig::default())
    }
}

impl ColorClusterer {
    pub fn new(config: &ColorConfig) -> Self {
        Self {
            k: config.k,
            min_percentage: config.min_percentage,
            max_pixels: config.max_pixels,
            restarts: config.restarts,
            max_iterations: config.max_iterations,
            seed: config.seed,
            namer: ColorNamer,
        }
    }

    /// Same clusterer with a different cluster count
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Ranked dominant colours using the configured `k` and minimum percentage
    pub fn extract_dominant_colors(&self, image: &RasterImage) -> Vec<DominantColor> {
        self.extract_with(image, self.k, self.min_percentage)
    }

    /// Ranked dominant colours of `image`, largest share first.
    ///
    /// Clusters below `min_percentage` are dropped, so the percentages need
    /// not add up to 100. A degenerate image (no pixels) yields an empty list.
    pub fn extract_with(&self, image: &RasterImage, k: usize, min_percentage: f64) -> Vec<DominantColor> {
        let pixels = sample_pixels(image, self.max_pixels);
        let fit = match kmeans(&pixels, k, self.restarts, self.max_iterations, self.seed) {
            Ok(fit) => fit,
            Err(e) => {
                debug!("No dominant colours for {}x{} region: {}", image.width(), image.height(), e);
                return Vec::new();
            }
        };

        let total = pixels.len() as f64;
        let mut colors: Vec<DominantColor> = fit
            .centers
            .iter()
            .zip(&fit.counts)
            .filter(|&(_, &count)| count > 0)
            .filter_map(|(center, &count)| {
                let percentage = count as f64 / total * 100.0;
                if percentage < min_percentage {
                    return None;
                }
                // Centres are truncated, not rounded
                let rgb = center.map(|c| c.clamp(0.0, 255.0) as u8);
                Some(DominantColor {
                    rgb,
                    hex: format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]),
                    name: self.namer.name_color(rgb),
                    percentage: round2(percentage),
                })
            })
            .collect();

        colors.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        debug!(
            "Clustered {} pixels into {} dominant colours (k = {})",
            pixels.len(),
            colors.len(),
            k
        );
        colors
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Flatten the image into RGB points, downsampling first when it has more
/// than `max_pixels` pixels.
fn sample_pixels(image: &RasterImage, max_pixels: u32) -> Vec<[f64; 3]> {
    let (width, height) = (image.width(), image.height());
    let count = width as u64 * height as u64;

    let flatten = |rgb: &image::RgbImage| -> Vec<[f64; 3]> {
        rgb.pixels()
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect()
    };

    if count > max_pixels as u64 {
        let scale = (max_pixels as f64 / count as f64).sqrt();
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);
        debug!("Downsampling {}x{} to {}x{} for clustering", width, height, new_width, new_height);
        let resized = image::imageops::resize(image.rgb(), new_width, new_height, FilterType::Triangle);
        flatten(&resized)
    } else {
        flatten(image.rgb())
    }
}

/// Result of the best k-means restart
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centers: Vec<[f64; 3]>,
    pub counts: Vec<usize>,
    pub inertia: f64,
}

/// Lloyd's k-means with k-means++ seeding, `restarts` times from one seeded
/// generator, keeping the lowest-inertia fit.
///
/// When the points hold fewer distinct values than `k`, seeding stops early
/// and the fit has fewer centres.
pub fn kmeans(
    points: &[[f64; 3]],
    k: usize,
    restarts: usize,
    max_iterations: usize,
    seed: u64,
) -> Result<KMeansFit> {
    if points.is_empty() {
        return Err(FlagError::Clustering("no pixels to cluster".into()));
    }
    if k == 0 {
        return Err(FlagError::Clustering("cluster count must be positive".into()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut best: Option<KMeansFit> = None;

    for _ in 0..restarts.max(1) {
        let centers = seed_centers(points, k, &mut rng);
        let fit = lloyd(points, centers, max_iterations);
        if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    best.ok_or_else(|| FlagError::Clustering("no restart produced a fit".into()))
}

fn distance_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn nearest(point: &[f64; 3], centers: &[[f64; 3]]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, center) in centers.iter().enumerate() {
        let d = distance_sq(point, center);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++ seeding: each new centre is drawn with probability proportional
/// to its squared distance from the closest existing centre.
fn seed_centers(points: &[[f64; 3]], k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..points.len())]);

    let mut min_dist: Vec<f64> = points.iter().map(|p| distance_sq(p, &centers[0])).collect();

    while centers.len() < k {
        let total: f64 = min_dist.iter().sum();
        if total <= 0.0 {
            break;
        }

        let target = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = points.len() - 1;
        for (i, d) in min_dist.iter().enumerate() {
            cumulative += d;
            if cumulative >= target && *d > 0.0 {
                chosen = i;
                break;
            }
        }

        let center = points[chosen];
        for (d, p) in min_dist.iter_mut().zip(points) {
            *d = d.min(distance_sq(p, &center));
        }
        centers.push(center);
    }

    centers
}

fn assign(points: &[[f64; 3]], centers: &[[f64; 3]], labels: &mut [usize]) -> bool {
    let mut changed = false;
    for (label, point) in labels.iter_mut().zip(points) {
        let (index, _) = nearest(point, centers);
        if *label != index {
            *label = index;
            changed = true;
        }
    }
    changed
}

fn lloyd(points: &[[f64; 3]], mut centers: Vec<[f64; 3]>, max_iterations: usize) -> KMeansFit {
    let k = centers.len();
    let mut labels = vec![usize::MAX; points.len()];

    for _ in 0..max_iterations {
        if !assign(points, &centers, &mut labels) {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            for c in 0..3 {
                sums[label][c] += point[c];
            }
            counts[label] += 1;
        }

        let mut shift = 0.0;
        for (i, center) in centers.iter_mut().enumerate() {
            // Empty clusters keep their previous centre
            if counts[i] == 0 {
                continue;
            }
            let updated = sums[i].map(|s| s / counts[i] as f64);
            shift += distance_sq(center, &updated);
            *center = updated;
        }

        if shift <= constants::colors::CONVERGENCE_TOLERANCE {
            break;
        }
    }

    assign(points, &centers, &mut labels);

    let mut counts = vec![0usize; k];
    let mut inertia = 0.0;
    for (point, &label) in points.iter().zip(&labels) {
        counts[label] += 1;
        inertia += distance_sq(point, &centers[label]);
    }

    KMeansFit { centers, counts, inertia }
}
