//! Crate-wide error type.
//!
//! Every build step fails fast: an error aborts the enclosing step and is
//! returned to the caller untouched. Nothing retries internally.
//!
//! A request that matches nothing is *not* an error; the router resolves it
//! to [`crate::router::RouteDecision::NotFound`].

use std::path::PathBuf;

use crate::routes::RouteError;

/// Errors produced while compiling a build or generating a distribution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required build artifact is missing.
    #[error("{artifact} not found at {path}. {hint}")]
    Configuration {
        artifact: &'static str,
        path: PathBuf,
        hint: &'static str,
    },

    /// User input refers to something the build does not contain.
    #[error("{0}")]
    Validation(String),

    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON artifact could not be read or written.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A route template in the build output is malformed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A cache-control `test` expression does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a serde_json error with the path it concerns.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
