//! Proxy Sieve - concurrent proxy list checker
//!
//! Reads a list of `scheme://host:port` proxies, checks each one against a
//! target URL with a fixed pool of workers and writes the ones that work
//! to a file. Ctrl-C stops the check early and still writes what was found.

pub mod error;
pub mod logging;
pub mod proxy;

pub use error::{FlushError, LoadError};
pub use proxy::*;

use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Default URL to test proxies against
const DEFAULT_TARGET_URL: &str = "https://check-host.net/";

/// Default number of concurrent workers
const DEFAULT_WORKERS: usize = 10;

/// Default timeout for each probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 2;

const DEFAULT_OUTPUT_PATH: &str = "valid-proxies.txt";

const DEFAULT_LOG_PATH: &str = "log";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL every proxy is probed against
    pub target_url: String,
    /// Number of concurrent workers
    pub workers: usize,
    /// Timeout for each probe
    pub timeout: Duration,
    /// File the working proxies are written to
    pub output_path: PathBuf,
    /// File diagnostics are written to
    pub log_path: PathBuf,
    /// Diagnostic verbosity
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_level: LevelFilter::Error,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }
}
