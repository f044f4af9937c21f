use crate::{error::Result, types::{RasterImage, ShapeCounts, SymbolicAnnotation}};

/// One independent shape heuristic. The shape detector runs its passes in
/// order and sums their partial counts.
pub trait ShapePass: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Count the shapes this pass is responsible for
    fn detect(&self, image: &RasterImage) -> Result<ShapeCounts>;
}

/// Source of symbolic annotations keyed by flag identifier (usually an ISO
/// country code). Implementations own the reference data; the analysis core
/// only reads it.
pub trait SymbolicLookup: Send + Sync {
    fn lookup(&self, identifier: &str) -> Option<SymbolicAnnotation>;
}

impl SymbolicLookup for std::collections::HashMap<String, SymbolicAnnotation> {
    fn lookup(&self, identifier: &str) -> Option<SymbolicAnnotation> {
        self.get(identifier).cloned()
    }
}

impl SymbolicLookup for std::collections::BTreeMap<String, SymbolicAnnotation> {
    fn lookup(&self, identifier: &str) -> Option<SymbolicAnnotation> {
        self.get(identifier).cloned()
    }
}
