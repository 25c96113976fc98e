//! Error types for proxy-sieve.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make the proxy list unusable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("proxy list {0:?} doesn't exist")]
    NotFound(PathBuf),

    #[error("failed to read proxy list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Line numbers are 1-based.
    #[error("line {line}: {content:?} is not a scheme://host:port proxy (expected http, https or socks*)")]
    InvalidScheme { line: usize, content: String },
}

/// Errors raised when writing the validated proxies.
#[derive(Debug, Error)]
pub enum FlushError {
    #[error("results were already flushed")]
    AlreadyFlushed,

    #[error("failed to write results to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
