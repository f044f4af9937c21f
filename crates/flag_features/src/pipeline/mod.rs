pub mod builder;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::{
    algorithms::{ColorClusterer, ComplexityScorer, LayoutAnalyzer, PatternDetector, ShapeDetector},
    config::AnalysisConfig,
    error::{ErrorKind, FlagError, Result},
    traits::SymbolicLookup,
    types::{unique_categories, FlagFeatureRecord, RasterImage},
};

/// Encoded image bytes waiting for analysis
#[derive(Debug, Clone)]
pub struct FlagImage {
    pub identifier: String,
    pub bytes: Vec<u8>,
    /// Where the bytes came from, copied into the record
    pub path: Option<String>,
}

impl FlagImage {
    pub fn new(identifier: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            identifier: identifier.into(),
            bytes,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Why one image of a batch produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<FlagError> for BatchFailure {
    fn from(error: FlagError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of a batch run. Failed images appear only in `failures`.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: BTreeMap<String, FlagFeatureRecord>,
    pub failures: BTreeMap<String, BatchFailure>,
    /// Images never started, or finished after cancellation
    pub skipped: usize,
}

/// Runs colour, pattern, shape and layout analysis on flag images and
/// assembles one [`FlagFeatureRecord`] per image.
///
/// Per-image work is single-threaded; batches fan out over a rayon pool.
pub struct FlagAnalysisEngine {
    config: AnalysisConfig,
    clusterer: ColorClusterer,
    patterns: PatternDetector,
    shapes: ShapeDetector,
    layout: LayoutAnalyzer,
    scorer: ComplexityScorer,
    symbolic: Option<Arc<dyn SymbolicLookup>>,
    pool: Option<ThreadPool>,
}

impl FlagAnalysisEngine {
    pub fn builder() -> builder::FlagAnalysisEngineBuilder {
        builder::FlagAnalysisEngineBuilder::new()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode and analyse one image
    pub fn analyze(&self, bytes: &[u8], identifier: &str) -> Result<FlagFeatureRecord> {
        let image = RasterImage::from_bytes(bytes, identifier)?;
        self.analyze_image(&image, identifier)
    }

    /// Analyse an already decoded image
    pub fn analyze_image(&self, image: &RasterImage, identifier: &str) -> Result<FlagFeatureRecord> {
        debug!("Analysing '{}' ({}x{})", identifier, image.width(), image.height());

        let dominant_colors = self.clusterer.extract_dominant_colors(image);
        let stripes = self.patterns.detect_stripes(image);
        let shapes = self.shapes.detect_shapes(image)?;
        let layout = self.layout.analyze_layout(image);
        // A miss still records the all-false annotation
        let symbolic = Some(
            self.symbolic
                .as_ref()
                .and_then(|lookup| lookup.lookup(identifier))
                .unwrap_or_default(),
        );

        let color_count = unique_categories(&dominant_colors).len();
        let complexity_score = self.scorer.score(&shapes, &stripes, color_count, symbolic.as_ref());

        Ok(FlagFeatureRecord::assemble(
            identifier,
            dominant_colors,
            stripes,
            shapes,
            layout,
            symbolic,
            complexity_score,
        ))
    }

    /// Analyse every image; a bad image is reported, never fatal
    pub fn analyze_batch(&self, images: Vec<FlagImage>) -> BatchReport {
        self.analyze_batch_cancellable(images, &AtomicBool::new(false))
    }

    /// Like [`analyze_batch`](Self::analyze_batch), but stops dispatching once
    /// `cancel` is set. Results that complete after cancellation are dropped.
    pub fn analyze_batch_cancellable(&self, images: Vec<FlagImage>, cancel: &AtomicBool) -> BatchReport {
        let total = images.len();
        info!("Analysing batch of {} images", total);

        let run = || -> Vec<Option<(String, Result<FlagFeatureRecord>)>> {
            images
                .into_par_iter()
                .map(|image| {
                    if cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    let outcome = self.analyze(&image.bytes, &image.identifier).map(|record| match image.path {
                        Some(path) => record.with_file_path(path),
                        None => record,
                    });
                    if cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    Some((image.identifier, outcome))
                })
                .collect()
        };
        let outcomes = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        // Single-threaded merge
        let mut report = BatchReport::default();
        for outcome in outcomes {
            let Some((identifier, result)) = outcome else {
                report.skipped += 1;
                continue;
            };
            match result {
                Ok(record) => {
                    if report.records.contains_key(&identifier) {
                        warn!("Duplicate identifier '{}', keeping the later image", identifier);
                    }
                    report.failures.remove(&identifier);
                    report.records.insert(identifier, record);
                }
                Err(e) => {
                    warn!("Skipping '{}': {}", identifier, e);
                    if report.records.remove(&identifier).is_some() {
                        warn!("Duplicate identifier '{}', dropping the earlier record", identifier);
                    }
                    report.failures.insert(identifier, e.into());
                }
            }
        }

        info!(
            "Batch complete: {} analysed, {} failed, {} skipped",
            report.records.len(),
            report.failures.len(),
            report.skipped
        );
        report
    }

    pub fn info(&self) -> String {
        format!(
            "FlagAnalysisEngine: k = {}, region k = {}, {}, symbolic lookup: {}, workers: {}",
            self.config.colors.k,
            self.config.layout.region_k,
            self.shapes.info(),
            if self.symbolic.is_some() { "yes" } else { "no" },
            self.pool
                .as_ref()
                .map_or_else(|| "global".to_string(), |p| p.current_num_threads().to_string())
        )
    }
}

/// Identifier for an image file: its stem up to the first `_`
/// (`hu_flag.png` -> `hu`)
pub fn identifier_from_path(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    stem.split('_').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ShapeCounts, StripeProfile, SymbolicAnnotation};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn png_bytes(rgb: RgbImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("encode png");
        cursor.into_inner()
    }

    fn tricolor() -> RgbImage {
        RgbImage::from_fn(240, 150, |_, y| match y / 50 {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([255, 255, 255]),
            _ => Rgb([0, 0, 255]),
        })
    }

    fn star_flag() -> RgbImage {
        let mut rgb = RgbImage::from_pixel(300, 150, Rgb([0, 0, 255]));
        let points: Vec<Point<i32>> = (0..10)
            .map(|i| {
                let radius = if i % 2 == 0 { 20.0 } else { 8.0 };
                let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
                Point::new(
                    (175.0 + radius * angle.cos()).round() as i32,
                    (75.0 + radius * angle.sin()).round() as i32,
                )
            })
            .collect();
        draw_polygon_mut(&mut rgb, &points, Rgb([255, 255, 255]));
        rgb
    }

    fn engine() -> FlagAnalysisEngine {
        FlagAnalysisEngine::builder().build().unwrap()
    }

    #[test]
    fn test_tricolor_bands() {
        let record = engine().analyze(&png_bytes(tricolor()), "fr").unwrap();
        assert_eq!(record.identifier, "fr");
        assert!(record.stripes.has_horizontal_bands);
        assert!(!record.stripes.has_horizontal_stripes);
        for name in ["red", "white", "blue"] {
            assert!(record.unique_colors.iter().any(|c| c == name), "missing {name}");
        }
        assert!(record.is_tricolor);
        assert!(!record.is_bicolor);
        assert!(record.layout.is_horizontal);
    }

    #[test]
    fn test_star_on_blue() {
        let record = engine().analyze(&png_bytes(star_flag()), "star").unwrap();
        assert!(record.shapes.stars >= 1);
        assert_eq!(record.shapes.total_shapes, record.shapes.total());

        let expected = ComplexityScorer.score(&record.shapes, &record.stripes, record.color_count, None);
        assert_eq!(record.complexity_score, expected);
        // At least the per-shape and per-star weight of one star
        assert!(record.complexity_score >= 5.0);
    }

    #[test]
    fn test_uniform_image() {
        let rgb = RgbImage::from_pixel(150, 100, Rgb([0, 122, 61]));
        let record = engine().analyze(&png_bytes(rgb), "plain").unwrap();
        assert_eq!(record.shapes, ShapeCounts::default());
        assert_eq!(record.stripes, StripeProfile::default());
        assert_eq!(record.dominant_colors.len(), 1);
        assert!(record.dominant_colors[0].percentage > 99.0);
        assert_eq!(record.color_count, 1);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let bytes = png_bytes(star_flag());
        let engine = engine();
        let first = engine.analyze(&bytes, "x").unwrap();
        let second = engine.analyze(&bytes, "x").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_isolates_corrupt_images() {
        let images = vec![
            FlagImage::new("fr", png_bytes(tricolor())).with_path("flags/fr_flag.png"),
            FlagImage::new("xx", b"not an image at all".to_vec()),
        ];
        let report = engine().analyze_batch(images);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records["fr"].file_path.as_deref(), Some("flags/fr_flag.png"));
        assert!(!report.records.contains_key("xx"));
        assert_eq!(report.failures["xx"].kind, ErrorKind::ImageDecode);
        assert!(report.failures["xx"].message.contains("xx"));
        assert!(report.failures["xx"].to_string().starts_with("[image_decode]"));
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_later_corrupt_duplicate_replaces_record() {
        let images = vec![
            FlagImage::new("dup", png_bytes(tricolor())),
            FlagImage::new("dup", b"garbage".to_vec()),
        ];
        let report = engine().analyze_batch(images);
        assert!(!report.records.contains_key("dup"));
        assert_eq!(report.failures["dup"].kind, ErrorKind::ImageDecode);
    }

    #[test]
    fn test_later_good_duplicate_clears_failure() {
        let images = vec![
            FlagImage::new("dup", b"garbage".to_vec()),
            FlagImage::new("dup", png_bytes(tricolor())),
        ];
        let report = engine().analyze_batch(images);
        assert!(report.records.contains_key("dup"));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_cancelled_batch_skips_everything() {
        let images = vec![
            FlagImage::new("a", png_bytes(tricolor())),
            FlagImage::new("b", png_bytes(tricolor())),
        ];
        let report = engine().analyze_batch_cancellable(images, &AtomicBool::new(true));
        assert!(report.records.is_empty());
        assert!(report.failures.is_empty());
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_dedicated_pool() {
        let mut config = AnalysisConfig::default();
        config.batch.workers = Some(2);
        let engine = FlagAnalysisEngine::builder().with_config(config).build().unwrap();
        assert!(engine.info().contains("workers: 2"));

        let report = engine.analyze_batch(vec![FlagImage::new("fr", png_bytes(tricolor()))]);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_symbolic_decoration() {
        let mut table = BTreeMap::new();
        table.insert(
            "fr".to_string(),
            SymbolicAnnotation {
                has_human: true,
                details: vec!["marianne".into()],
                ..Default::default()
            },
        );
        let engine = FlagAnalysisEngine::builder()
            .with_symbolic_lookup(Arc::new(table))
            .build()
            .unwrap();

        let bytes = png_bytes(tricolor());
        let decorated = engine.analyze(&bytes, "fr").unwrap();
        let plain = engine.analyze(&bytes, "it").unwrap();

        assert!(decorated.symbolic_or_default().has_human);
        assert_eq!(plain.symbolic, Some(SymbolicAnnotation::default()));
        assert_eq!(decorated.complexity_score, plain.complexity_score + 5.0);
    }

    #[test]
    fn test_symbolic_is_always_present() {
        let record = engine().analyze(&png_bytes(tricolor()), "fr").unwrap();
        assert_eq!(record.symbolic, Some(SymbolicAnnotation::default()));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["symbolic"]["has_human"], serde_json::Value::Bool(false));
        assert!(value["symbolic"]["details"].as_array().is_some_and(|d| d.is_empty()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.colors.k = 0;
        assert!(FlagAnalysisEngine::builder().with_config(config).build().is_err());
    }

    #[test]
    fn test_identifier_from_path() {
        assert_eq!(identifier_from_path(Path::new("flags/hu_flag.png")), "hu");
        assert_eq!(identifier_from_path(Path::new("de.png")), "de");
        assert_eq!(identifier_from_path(Path::new("gb_eng_flag.webp")), "gb");
    }
}
