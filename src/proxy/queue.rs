//! Shared work queue for the checker workers

use crate::proxy::models::ProxyEndpoint;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// FIFO of endpoints waiting to be probed.
///
/// Filled once before the workers start. Clones share the same queue, and
/// [`pop`](Self::pop) hands every endpoint to exactly one caller.
#[derive(Debug, Clone, Default)]
pub struct ValidationQueue {
    inner: Arc<Mutex<VecDeque<ProxyEndpoint>>>,
}

impl ValidationQueue {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(endpoints.into())),
        }
    }

    /// Take the next endpoint, or `None` once the queue is drained.
    ///
    /// Never waits: emptiness check and removal happen under one lock.
    pub fn pop(&self) -> Option<ProxyEndpoint> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
