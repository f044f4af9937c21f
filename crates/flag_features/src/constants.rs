//! Default thresholds for flag feature extraction
//!
//! These values are the tuning surface of the whole pipeline. Every field of
//! [`crate::config::AnalysisConfig`] defaults to one of them, and stored
//! feature documents are only comparable when produced with the same set.

/// Dominant colour clustering
pub mod colors {
    /// Number of k-means clusters requested for a whole flag
    pub const DEFAULT_CLUSTER_COUNT: usize = 5;

    /// Clusters covering less than this share of the sampled pixels (in
    /// percent) are treated as noise and dropped
    pub const MIN_PERCENTAGE: f64 = 1.0;

    /// Images with more pixels than this are downsampled before clustering.
    /// Keeps clustering cost bounded while colour proportions stay intact.
    pub const MAX_CLUSTER_PIXELS: u32 = 50_000;

    /// Independent k-means++ initialisations; the lowest-inertia run wins
    pub const RESTARTS: usize = 10;

    /// Lloyd iteration cap per restart
    pub const MAX_ITERATIONS: usize = 300;

    /// Centre shift (squared, summed over clusters) at which Lloyd stops early
    pub const CONVERGENCE_TOLERANCE: f64 = 1e-4;

    /// Fixed seed so the same bytes always yield the same colours
    pub const SEED: u64 = 42;
}

/// Quadrant / centre region colours
pub mod layout {
    /// Clusters per region; only the top one is kept
    pub const REGION_CLUSTER_COUNT: usize = 3;

    /// |aspect - 1| below this counts as square
    pub const SQUARE_TOLERANCE: f64 = 0.1;

    /// Aspect ratio above which a flag is horizontal
    pub const HORIZONTAL_MIN_ASPECT: f64 = 1.5;

    /// Aspect ratio below which a flag is vertical
    pub const VERTICAL_MAX_ASPECT: f64 = 0.7;
}

/// Stripe / band classification on intensity profiles
pub mod stripes {
    /// Fewer transitions than this means the axis has no structure
    pub const MIN_BAND_TRANSITIONS: usize = 2;

    /// Up to this many transitions the regions are wide bands; above it they
    /// are narrow stripes
    pub const MAX_BAND_TRANSITIONS: usize = 4;
}

/// Shape detection passes
pub mod shapes {
    /// Canny hysteresis thresholds for the contour pass
    pub const CANNY_LOW: f32 = 30.0;
    pub const CANNY_HIGH: f32 = 100.0;

    /// Contours enclosing less area (px²) are noise
    pub const MIN_CONTOUR_AREA: f64 = 50.0;

    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub const APPROX_EPSILON_RATIO: f64 = 0.015;

    /// Relative difference between contour area and its enclosing circle area
    /// under which a many-sided polygon is a circle
    pub const CIRCLE_AREA_TOLERANCE: f64 = 0.3;

    /// Hull must have at least this many points before defects are examined
    pub const MIN_HULL_POINTS: usize = 4;

    /// Concave defects at or above this count mark a star
    pub const MIN_STAR_DEFECTS: usize = 3;

    /// Concavities shallower than this (px) are pixel staircase, not defects
    pub const MIN_DEFECT_DEPTH: f64 = 1.0;

    /// Heuristic star pass: candidate blob area range (px², exclusive)
    pub const STAR_MIN_AREA: f64 = 20.0;
    pub const STAR_MAX_AREA: f64 = 1000.0;

    /// Heuristic star pass: compactness 4πA/P² range (exclusive). Circles sit
    /// near 1.0 and slivers near 0.
    pub const STAR_MIN_COMPACTNESS: f64 = 0.1;
    pub const STAR_MAX_COMPACTNESS: f64 = 0.7;

    /// Heuristic star pass never contributes more than this per image
    pub const MAX_HEURISTIC_STARS: u32 = 10;

    /// Cross pass: structuring element lengths are image width / height
    /// divided by this
    pub const CROSS_KERNEL_DIVISOR: u32 = 4;

    /// Cross pass: structuring element thickness (px)
    pub const CROSS_KERNEL_THICKNESS: u32 = 3;

    /// Cross pass: overlap pixels must be brighter than this
    pub const CROSS_INTENSITY: u8 = 100;

    /// Cross pass: overlap must cover at least this fraction of the image
    pub const CROSS_MIN_OVERLAP: f64 = 0.01;
}
