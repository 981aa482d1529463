//! Error types for profmap-core

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source text could not be parsed into a syntax tree
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// A trace location could not be mapped back to an original source
    #[error("cannot resolve source location for {url}: {reason}")]
    Unresolvable { url: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn unresolvable(url: &str, reason: impl Into<String>) -> Self {
        Error::Unresolvable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
