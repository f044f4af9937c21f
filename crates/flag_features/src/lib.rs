//! # Flag Feature Extraction Library
//!
//! Turns flag images into structured, searchable feature records: dominant
//! colours, stripe and band layout, shape counts (stars, crosses, circles,
//! triangles, rectangles), region colours and a composite complexity score.
//!
//! ## Core Features
//!
//! - **Deterministic**: k-means runs from a fixed seed, so the same bytes
//!   always give the same record
//! - **Pass-based Shape Detection**: independent heuristics behind the
//!   [`ShapePass`] trait, summed by a [`ShapeDetector`]
//! - **Injected Knowledge**: symbolic annotations come from any
//!   [`SymbolicLookup`], never from the algorithms themselves
//! - **Batch Analysis**: parallel over images, with per-image failure isolation
//! - **Feature Store**: JSON persistence with colour and pattern queries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flag_features::{FlagAnalysisEngine, FeatureStore, PatternKind};
//!
//! let engine = FlagAnalysisEngine::builder().build()?;
//! let bytes = std::fs::read("flags/fr_flag.png")?;
//! let record = engine.analyze(&bytes, "fr")?;
//! println!("{} colours, tricolour: {}", record.color_count, record.is_tricolor);
//!
//! let mut store = FeatureStore::new("features.json");
//! store.save([(record.identifier.clone(), record)].into_iter().collect())?;
//! println!("{:?}", store.query_by_pattern(PatternKind::Bands));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Shape Passes
//!
//! ```rust,no_run
//! use flag_features::{FlagAnalysisEngine, ShapeDetector, ContourShapePass, CrossPass};
//!
//! let detector = ShapeDetector::builder()
//!     .add_pass(ContourShapePass::default())
//!     .add_pass(CrossPass::default())
//!     .build();
//! let engine = FlagAnalysisEngine::builder()
//!     .with_shape_detector(detector)
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod constants;
pub mod config;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod store;
pub mod symbolic;

// Re-exports for convenience
pub use error::{ErrorKind, FlagError, Result};
pub use config::AnalysisConfig;
pub use types::*;
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{identifier_from_path, BatchFailure, BatchReport, FlagAnalysisEngine, FlagImage, builder::FlagAnalysisEngineBuilder};
pub use store::{FeatureStore, PatternKind};
pub use symbolic::SymbolicTable;
