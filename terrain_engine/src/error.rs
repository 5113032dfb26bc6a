use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort session initialisation. Individual malformed data
/// rows never surface here; they are skipped by the table reader.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("terrain model {}: {message}", path.display())]
    Terrain { path: PathBuf, message: String },
    #[error("dataset {}: {message}", path.display())]
    Dataset { path: PathBuf, message: String },
    #[error("dataset {} names unknown category '{category}'", path.display())]
    UnknownCategory { path: PathBuf, category: String },
    #[error("terrain model {} contains no geometry", path.display())]
    EmptyTerrain { path: PathBuf },
}
