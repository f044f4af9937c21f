use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::warn;

use crate::{
    algorithms::{ColorClusterer, ComplexityScorer, LayoutAnalyzer, PatternDetector, ShapeDetector},
    config::AnalysisConfig,
    error::Result,
    pipeline::FlagAnalysisEngine,
    traits::SymbolicLookup,
};

/// Builder for [`FlagAnalysisEngine`] with a fluent API
#[derive(Default)]
pub struct FlagAnalysisEngineBuilder {
    config: AnalysisConfig,
    shape_detector: Option<ShapeDetector>,
    symbolic: Option<Arc<dyn SymbolicLookup>>,
}

impl FlagAnalysisEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom set of shape passes instead of the configured defaults
    pub fn with_shape_detector(mut self, detector: ShapeDetector) -> Self {
        self.shape_detector = Some(detector);
        self
    }

    /// Decorate records with annotations from `lookup`
    pub fn with_symbolic_lookup(mut self, lookup: Arc<dyn SymbolicLookup>) -> Self {
        self.symbolic = Some(lookup);
        self
    }

    /// Validate the configuration and assemble the engine
    pub fn build(self) -> Result<FlagAnalysisEngine> {
        self.config.validate()?;

        let shapes = self
            .shape_detector
            .unwrap_or_else(|| ShapeDetector::from_config(&self.config.shapes));
        let pool = self.config.batch.workers.and_then(worker_pool);

        Ok(FlagAnalysisEngine {
            clusterer: ColorClusterer::new(&self.config.colors),
            patterns: PatternDetector::default(),
            shapes,
            layout: LayoutAnalyzer::new(&self.config),
            scorer: ComplexityScorer,
            symbolic: self.symbolic,
            pool,
            config: self.config,
        })
    }
}

/// Dedicated batch pool; `None` falls back to the global rayon pool
fn worker_pool(workers: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("flag-worker-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Could not start {} batch workers, using the global pool: {}", workers, e);
            None
        }
    }
}
