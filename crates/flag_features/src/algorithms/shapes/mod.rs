pub mod geometry;
pub mod contour;
pub mod star_pattern;
pub mod cross;

pub use contour::{ContourClass, ContourShapePass};
pub use cross::CrossPass;
pub use star_pattern::StarPatternPass;

use tracing::debug;

use crate::{
    config::ShapeConfig,
    error::Result,
    traits::ShapePass,
    types::{RasterImage, ShapeCounts},
};

/// Runs independent shape passes and sums their counts.
///
/// Passes are not deduplicated against each other: a star found by both the
/// contour pass and the star-pattern pass is counted twice.
pub struct ShapeDetector {
    passes: Vec<Box<dyn ShapePass>>,
}

impl ShapeDetector {
    pub fn builder() -> ShapeDetectorBuilder {
        ShapeDetectorBuilder::new()
    }

    /// The standard contour, star-pattern and cross passes
    pub fn from_config(config: &ShapeConfig) -> Self {
        Self::builder()
            .add_pass(ContourShapePass::new(config))
            .add_pass(StarPatternPass::new(config))
            .add_pass(CrossPass::new(config))
            .build()
    }

    pub fn detect_shapes(&self, image: &RasterImage) -> Result<ShapeCounts> {
        let mut counts = ShapeCounts::default();
        for pass in &self.passes {
            let partial = pass.detect(image)?;
            debug!("Shape pass '{}': {:?}", pass.name(), partial);
            counts += partial;
        }
        Ok(counts)
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn info(&self) -> String {
        format!("ShapeDetector: {} passes [{}]", self.passes.len(), self.pass_names().join(", "))
    }
}

impl Default for ShapeDetector {
    fn default() -> Self {
        Self::from_config(&ShapeConfig::default())
    }
}

impl std::fmt::Debug for ShapeDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeDetector")
            .field("passes", &self.pass_names())
            .finish()
    }
}

#[derive(Default)]
pub struct ShapeDetectorBuilder {
    passes: Vec<Box<dyn ShapePass>>,
}

impl ShapeDetectorBuilder {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass; passes run in insertion order
    pub fn add_pass<P>(mut self, pass: P) -> Self
    where
        P: ShapePass + 'static,
    {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn build(self) -> ShapeDetector {
        ShapeDetector { passes: self.passes }
    }
}
