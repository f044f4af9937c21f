use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{
    error::{FlagError, Result},
    traits::SymbolicLookup,
    types::SymbolicAnnotation,
};

/// In-memory annotation table keyed by lower-cased identifier.
///
/// Loaded from a JSON object of `identifier -> annotation`, e.g.
///
/// ```json
/// { "mx": { "has_animal": true, "has_plant": true, "details": ["eagle", "cactus"] } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolicTable {
    entries: BTreeMap<String, SymbolicAnnotation>,
}

impl SymbolicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, SymbolicAnnotation> = serde_json::from_str(content)?;
        Ok(raw.into_iter().collect())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| FlagError::Config(format!("cannot read symbolic table {}: {}", path.display(), e)))?;
        let table = Self::from_json(&content)?;
        debug!("Loaded {} symbolic annotations from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, identifier: &str, annotation: SymbolicAnnotation) -> Option<SymbolicAnnotation> {
        self.entries.insert(identifier.to_lowercase(), annotation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, SymbolicAnnotation)> for SymbolicTable {
    fn from_iter<I: IntoIterator<Item = (String, SymbolicAnnotation)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (identifier, annotation) in iter {
            table.insert(&identifier, annotation);
        }
        table
    }
}

impl SymbolicLookup for SymbolicTable {
    fn lookup(&self, identifier: &str) -> Option<SymbolicAnnotation> {
        self.entries.get(&identifier.to_lowercase()).cloned()
    }
}
