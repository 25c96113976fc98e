//! Collection of proxies that passed the check

use crate::error::FlushError;
use crate::proxy::models::ProxyEndpoint;
use log::{info, warn};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    valid: BTreeSet<ProxyEndpoint>,
    flushed: bool,
}

/// Concurrency-safe set of working proxies.
///
/// Clones share the same set. The set only grows until it is flushed,
/// which may happen once; afterwards it is frozen.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    inner: Arc<Mutex<Inner>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a working proxy. Returns `false` if it was already known or
    /// the collector has been flushed.
    pub fn insert(&self, endpoint: ProxyEndpoint) -> bool {
        let mut inner = self.inner.lock();
        if inner.flushed {
            warn!("Ignoring {} found after results were flushed", endpoint);
            return false;
        }
        inner.valid.insert(endpoint)
    }

    pub fn contains(&self, endpoint: &ProxyEndpoint) -> bool {
        self.inner.lock().valid.contains(endpoint)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().valid.is_empty()
    }

    /// Sorted copy of the current contents
    pub fn snapshot(&self) -> Vec<ProxyEndpoint> {
        self.inner.lock().valid.iter().cloned().collect()
    }

    /// Write the set to `path`, one proxy per line with a trailing newline,
    /// replacing any existing file. Returns the number of proxies written.
    ///
    /// Only the first call writes; later calls fail with
    /// [`FlushError::AlreadyFlushed`].
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> Result<usize, FlushError> {
        let path = path.as_ref();
        let mut inner = self.inner.lock();
        if inner.flushed {
            return Err(FlushError::AlreadyFlushed);
        }
        inner.flushed = true;

        let mut content = inner
            .valid
            .iter()
            .map(ProxyEndpoint::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        content.push('\n');

        fs::write(path, content).map_err(|source| FlushError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved {} valid proxies to {:?}", inner.valid.len(), path);
        Ok(inner.valid.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(s: &str) -> ProxyEndpoint {
        ProxyEndpoint::parse(s, 1).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let collector = ResultCollector::new();
        assert!(collector.insert(endpoint("http://1.2.3.4:8080")));
        assert!(!collector.insert(endpoint("http://1.2.3.4:8080")));
        assert_eq!(collector.len(), 1);
        assert!(collector.contains(&endpoint("http://1.2.3.4:8080")));
    }

    #[test]
    fn test_flush_writes_sorted_lines_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid-proxies.txt");

        let collector = ResultCollector::new();
        collector.insert(endpoint("socks5://5.6.7.8:1080"));
        collector.insert(endpoint("http://1.2.3.4:8080"));

        assert_eq!(collector.flush(&path).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "http://1.2.3.4:8080\nsocks5://5.6.7.8:1080\n"
        );
    }

    #[test]
    fn test_flush_empty_set_writes_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid-proxies.txt");
        fs::write(&path, "stale\n").unwrap();

        assert_eq!(ResultCollector::new().flush(&path).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "\n");
    }

    #[test]
    fn test_flush_only_once_and_freezes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let collector = ResultCollector::new();
        collector.insert(endpoint("http://1.2.3.4:8080"));
        collector.flush(&path).unwrap();

        assert!(matches!(collector.flush(&path), Err(FlushError::AlreadyFlushed)));
        assert!(!collector.insert(endpoint("http://9.9.9.9:80")));
        assert_eq!(fs::read_to_string(&path).unwrap(), "http://1.2.3.4:8080\n");
    }

    #[test]
    fn test_flush_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(
            ResultCollector::new().flush(&path),
            Err(FlushError::Io { .. })
        ));
    }
}
