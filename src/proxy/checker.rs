//! Proxy checker module for probing a single proxy

use crate::proxy::models::{ProbeOutcome, ProxyEndpoint};
use crate::Config;
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::{Duration, Instant};

/// A connectivity test run through one proxy.
///
/// Implementations must not fail: every problem is reported as a
/// non-working [`ProbeOutcome`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, endpoint: &ProxyEndpoint) -> ProbeOutcome;
}

/// Probe that fetches a target URL through the proxy with reqwest
#[derive(Debug, Clone)]
pub struct HttpProbe {
    target_url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(target_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.target_url.clone(), config.timeout)
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a reqwest client routing both http and https through the proxy
    fn create_client(&self, endpoint: &ProxyEndpoint) -> reqwest::Result<Client> {
        Client::builder()
            .proxy(ReqwestProxy::all(endpoint.as_str())?)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .build()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, endpoint: &ProxyEndpoint) -> ProbeOutcome {
        let start = Instant::now();

        let client = match self.create_client(endpoint) {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::Failed(e.to_string()),
        };

        match tokio::time::timeout(self.timeout, client.get(&self.target_url).send()).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => ProbeOutcome::Working {
                elapsed: start.elapsed(),
            },
            Ok(Ok(response)) => ProbeOutcome::Failed(format!("HTTP status: {}", response.status())),
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::Timeout,
            Ok(Err(e)) => ProbeOutcome::Failed(e.to_string()),
            Err(_) => ProbeOutcome::Timeout,
        }
    }
}
