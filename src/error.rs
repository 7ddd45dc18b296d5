//! Error types for the Dummy Operator

use thiserror::Error;

use crate::client::StoreError;

/// Result type alias using the operator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Operator error types
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the object from the store failed for a reason other than NotFound
    #[error("Failed to fetch Dummy '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Status write rejected because the object changed since it was read
    #[error("Conflict persisting status of Dummy '{key}': {message}")]
    Conflict { key: String, message: String },

    /// Status write failed for a reason other than a version conflict
    #[error("Failed to persist status of Dummy '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The execution context was cancelled while a store call was in flight
    #[error("Reconciliation of Dummy '{key}' cancelled")]
    Cancelled { key: String },

    /// Object handed over by the watch has no usable identity
    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    /// Kubernetes API error outside of the reconcile path
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Manifest rendering error
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether the controller should requeue the request after this error.
    ///
    /// Cancellation is reported but never rescheduled here; whoever cancelled
    /// decides what happens next.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch { .. } | Error::Conflict { .. } | Error::Persist { .. } => true,
            Error::Kube(_) => true,
            Error::Cancelled { .. }
            | Error::MissingObjectKey(_)
            | Error::Config(_)
            | Error::Yaml(_) => false,
        }
    }

    /// Short label used for metrics
    pub fn metric_label(&self) -> &'static str {
        match self {
            Error::Fetch { .. } => "fetch",
            Error::Conflict { .. } => "conflict",
            Error::Persist { .. } => "persist",
            Error::Cancelled { .. } => "cancelled",
            Error::MissingObjectKey(_) => "missing_key",
            Error::Kube(_) => "kube",
            Error::Config(_) => "config",
            Error::Yaml(_) => "yaml",
        }
    }
}
