//! Proxy list loading

use crate::error::LoadError;
use crate::proxy::models::ProxyEndpoint;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads candidate proxies, one `scheme://host:port` per line
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single line.
    ///
    /// Blank lines yield `Ok(None)`; anything else must be an endpoint with
    /// a recognized scheme.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ProxyEndpoint>, LoadError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        ProxyEndpoint::parse(line, line_no).map(Some)
    }

    /// Parse proxies from a string (multiple lines), failing on the first bad line
    pub fn parse_string(content: &str) -> Result<Vec<ProxyEndpoint>, LoadError> {
        let mut proxies = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            if let Some(endpoint) = Self::parse_line(line, idx + 1)? {
                debug!("Adding proxy to the queue: {}", endpoint);
                proxies.push(endpoint);
            }
        }

        Ok(proxies)
    }

    /// Load proxies from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<ProxyEndpoint>, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Self::parse_string(&content)
    }
}
