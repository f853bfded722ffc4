//! Fatal, typed errors. Per-row ingestion problems are deliberately not
//! represented here — they are counted and logged once per file (see
//! `feed::reader::log_skip_count`), never propagated.

use std::path::PathBuf;

use thiserror::Error;

/// Failures loading the persisted artifacts at query-engine startup. Any of
/// these aborts `main`.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact directory {0:?} does not exist")]
    MissingDirectory(PathBuf),
    #[error("could not read artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse artifact {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures loading the curated station manifest used by the reconciler.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest file {0:?} does not exist")]
    MissingFile(PathBuf),
    #[error("could not read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse manifest row in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
