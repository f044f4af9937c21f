use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::{debug, info};

use crate::{
    error::{FlagError, Result},
    types::FlagFeatureRecord,
};

/// Visual pattern families the store can be queried by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PatternKind {
    Stripes,
    Bands,
    Stars,
    Cross,
    Circle,
}

impl PatternKind {
    /// Parse a kind name, case-insensitively
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name.trim()).map_err(|_| FlagError::UnknownPattern(name.to_string()))
    }

    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn matches(&self, record: &FlagFeatureRecord) -> bool {
        match self {
            Self::Stripes => record.stripes.has_stripes(),
            Self::Bands => record.stripes.has_bands(),
            Self::Stars => record.shapes.stars > 0,
            Self::Cross => record.shapes.crosses > 0,
            Self::Circle => record.shapes.circles > 0,
        }
    }
}

/// JSON document of feature records keyed by identifier
#[derive(Debug, Clone)]
pub struct FeatureStore {
    path: PathBuf,
    records: BTreeMap<String, FlagFeatureRecord>,
}

impl FeatureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Open the store at `path`, loading it if it exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &BTreeMap<String, FlagFeatureRecord> {
        &self.records
    }

    /// Replace the held records and write them out.
    ///
    /// The document is written to a sibling temp file and renamed into place,
    /// so a failed save leaves the previous document intact.
    pub fn save(&mut self, records: BTreeMap<String, FlagFeatureRecord>) -> Result<()> {
        let json = serde_json::to_string_pretty(&records).map_err(|source| FlagError::StoreFormat {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| FlagError::store_io(parent, e))?;
        }

        // In-memory records change only once the document is in place
        let tmp = self.path.with_extension("json.tmp");
        let written = fs::write(&tmp, json)
            .map_err(|e| FlagError::store_io(&tmp, e))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|e| FlagError::store_io(&self.path, e)));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        self.records = records;
        info!("Saved {} records to {}", self.records.len(), self.path.display());
        Ok(())
    }

    /// Load the document. A missing file is an empty store; fields absent
    /// from stored records take their defaults.
    pub fn load(&mut self) -> Result<&BTreeMap<String, FlagFeatureRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No feature store at {}, starting empty", self.path.display());
                self.records.clear();
                return Ok(&self.records);
            }
            Err(e) => return Err(FlagError::store_io(&self.path, e)),
        };

        self.records = serde_json::from_str(&content).map_err(|source| FlagError::StoreFormat {
            path: self.path.clone(),
            source,
        })?;
        debug!("Loaded {} records from {}", self.records.len(), self.path.display());
        Ok(&self.records)
    }

    /// Identifiers of flags containing the colour category `name` (any case)
    pub fn query_by_color(&self, name: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, record)| record.has_color(name))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Identifiers of flags showing the pattern `kind`
    pub fn query_by_pattern(&self, kind: PatternKind) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, record)| kind.matches(record))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// JSON schema of the persisted document
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(BTreeMap<String, FlagFeatureRecord>)
    }
}
