//! Kubernetes controllers for Dummy Operator CRDs
//!
//! This module contains the controller implementations that watch for CRD changes
//! and trigger reconciliation.

mod backoff;
mod dummy_controller;

pub use backoff::Backoff;
pub use dummy_controller::run as run_dummy_controller;

use std::future::Future;
use std::sync::Arc;

use kube::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::client::{DummyClient, KubeDummyClient};

/// Shared context for all controllers
pub struct Context {
    /// Store capability used by the reconciler
    pub client: Arc<dyn DummyClient>,

    /// Cancelled on operator shutdown; aborts in-flight store calls
    pub shutdown: CancellationToken,

    /// Requeue delays for failing objects
    pub backoff: Backoff,
}

impl Context {
    /// Create a new context backed by the Kubernetes API server
    pub fn new(client: Client, shutdown: CancellationToken) -> Self {
        Self::with_store(Arc::new(KubeDummyClient::new(client)), shutdown)
    }

    /// Create a context over any store implementation
    pub fn with_store(client: Arc<dyn DummyClient>, shutdown: CancellationToken) -> Self {
        Self {
            client,
            shutdown,
            backoff: Backoff::default(),
        }
    }
}

/// Cancel `token` as soon as `signal` resolves
///
/// Runs alongside the controller so that reconciles still in flight during
/// the controller's graceful drain see the cancellation.
pub fn cancel_on<F>(signal: F, token: CancellationToken) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        info!("Cancelling in-flight reconciliations");
        token.cancel();
    })
}
