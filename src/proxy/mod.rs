//! Proxy module for loading and checking proxies
//!
//! This module provides functionality for:
//! - Loading `scheme://host:port` proxies from a list file
//! - Probing each proxy against a target URL with a bounded timeout
//! - Checking many proxies concurrently with a fixed pool of workers
//! - Stopping early on interruption while keeping the results found so far

pub mod checker;
pub mod collector;
pub mod models;
pub mod parser;
pub mod pool;
pub mod queue;
pub mod shutdown;

pub use checker::{HttpProbe, Probe};
pub use collector::ResultCollector;
pub use models::{ProbeOutcome, ProxyEndpoint, Scheme};
pub use parser::ProxyParser;
pub use pool::{SuccessObserver, ValidationContext, WorkerPool};
pub use queue::ValidationQueue;
pub use shutdown::{ShutdownCoordinator, ShutdownState, StopSignal, Supervised};
