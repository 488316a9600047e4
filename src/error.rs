use std::path::PathBuf;

use thiserror::Error;

/// Failures while producing the next target text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("word list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("word list contains no words")]
    EmptyWordList,

    #[error("no bundled word list named {name}")]
    UnknownWordList { name: String },
}

/// Failures while persisting a finished session.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
