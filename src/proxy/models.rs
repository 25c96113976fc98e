//! Proxy data models

use crate::error::LoadError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;

/// Matches `scheme://rest`, capturing the scheme
static ENDPOINT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*)://\S+$").expect("Invalid endpoint regex")
});

/// Proxy scheme recognized by the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    /// Any `socks*` flavour (socks4, socks5, socks5h, ...)
    Socks(String),
}

impl Scheme {
    /// Recognize a scheme by name; `None` when it is neither http(s) nor socks*
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            socks if socks.starts_with("socks") => Some(Scheme::Socks(socks.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
            Scheme::Socks(name) => write!(f, "{}", name),
        }
    }
}

/// A candidate proxy as read from the input list.
///
/// The endpoint is kept verbatim: two endpoints are the same proxy only if
/// their strings are identical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyEndpoint(String);

impl ProxyEndpoint {
    /// Validate a trimmed line and wrap it.
    ///
    /// `line_no` is only used to build the error.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, LoadError> {
        let invalid = || LoadError::InvalidScheme {
            line: line_no,
            content: line.to_string(),
        };

        let caps = ENDPOINT_REGEX.captures(line).ok_or_else(invalid)?;
        Scheme::from_name(&caps[1].to_ascii_lowercase()).ok_or_else(invalid)?;

        Ok(Self(line.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> Option<Scheme> {
        let (name, _) = self.0.split_once("://")?;
        Scheme::from_name(&name.to_ascii_lowercase())
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProxyEndpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The target answered `200` through the proxy
    Working { elapsed: Duration },
    Failed(String),
    Timeout,
}

impl ProbeOutcome {
    pub fn is_working(&self) -> bool {
        matches!(self, ProbeOutcome::Working { .. })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Working { elapsed } => write!(f, "working ({}ms)", elapsed.as_millis()),
            ProbeOutcome::Failed(reason) => write!(f, "failed: {}", reason),
            ProbeOutcome::Timeout => write!(f, "timed out"),
        }
    }
}
