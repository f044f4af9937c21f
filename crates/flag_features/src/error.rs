use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlagError {
    #[error("Failed to decode image '{identifier}': {source}")]
    ImageDecode {
        identifier: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Clustering failed: {0}")]
    Clustering(String),

    #[error("Feature store I/O error at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Feature store at {path} is not a valid document: {source}")]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown pattern kind '{0}' (expected stripes, bands, stars, cross or circle)")]
    UnknownPattern(String),
}

/// Which [`FlagError`] variant produced a failure, kept after the error
/// itself has been rendered to text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize,
    Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    ImageDecode,
    Clustering,
    StoreIo,
    StoreFormat,
    Config,
    Toml,
    Json,
    UnknownPattern,
}

impl FlagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ImageDecode { .. } => ErrorKind::ImageDecode,
            Self::Clustering(_) => ErrorKind::Clustering,
            Self::StoreIo { .. } => ErrorKind::StoreIo,
            Self::StoreFormat { .. } => ErrorKind::StoreFormat,
            Self::Config(_) => ErrorKind::Config,
            Self::Toml(_) => ErrorKind::Toml,
            Self::Json(_) => ErrorKind::Json,
            Self::UnknownPattern(_) => ErrorKind::UnknownPattern,
        }
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlagError>;
