use std::path::PathBuf;
use thiserror::Error;

use crate::merge::CategoryResolutionError;
use crate::validation::ValidationReport;

/// The main error type for cocomerge operations.
#[derive(Debug, Error)]
pub enum CocomergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to copy image {from} to {to}: {source}")]
    ImageCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to discover datasets under {path}: {message}")]
    DatasetDiscovery { path: PathBuf, message: String },

    #[error(transparent)]
    CategoryResolution(#[from] CategoryResolutionError),

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}
