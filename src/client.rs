//! Store access for Dummy resources
//!
//! The reconciler only ever needs two operations against the API server:
//! read one object and write its status. [`DummyClient`] exposes exactly
//! those so the reconciler can run against a mock or in-memory store in tests.

use std::fmt;

use async_trait::async_trait;
use kube::{api::PostParams, Api, Client, ResourceExt};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::crd::Dummy;
use crate::error::{Error, Result};

/// Identity of one namespaced object; the whole payload of a reconcile request
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an object delivered by the watch
    pub fn from_resource<K: ResourceExt>(obj: &K) -> Result<Self> {
        let name = obj
            .meta()
            .name
            .clone()
            .ok_or(Error::MissingObjectKey(".metadata.name"))?;
        let namespace = obj
            .namespace()
            .ok_or(Error::MissingObjectKey(".metadata.namespace"))?;
        Ok(Self { namespace, name })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Failures reported by the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Optimistic concurrency check failed (HTTP 409)
    #[error("resource version conflict: {0}")]
    Conflict(String),

    /// Any other API failure
    #[error(transparent)]
    Api(#[from] kube::Error),

    /// Object could not be encoded for the request body
    #[error("failed to encode object: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Classify an API error, separating version conflicts from the rest
    pub fn from_kube(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict(ae.message),
            other => StoreError::Api(other),
        }
    }
}

/// Read/write capability the reconciler depends on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DummyClient: Send + Sync {
    /// Fetch the current object; `Ok(None)` when it does not exist
    async fn get(&self, key: &ObjectKey) -> std::result::Result<Option<Dummy>, StoreError>;

    /// Replace the status subresource of `dummy`
    ///
    /// The object's `resourceVersion` travels with the request, so a write
    /// based on a stale read fails with [`StoreError::Conflict`].
    async fn update_status(
        &self,
        key: &ObjectKey,
        dummy: &Dummy,
    ) -> std::result::Result<Dummy, StoreError>;
}

/// [`DummyClient`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeDummyClient {
    client: Client,
}

impl KubeDummyClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Dummy> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl DummyClient for KubeDummyClient {
    async fn get(&self, key: &ObjectKey) -> std::result::Result<Option<Dummy>, StoreError> {
        match self.api(&key.namespace).get(&key.name).await {
            Ok(dummy) => Ok(Some(dummy)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(StoreError::from_kube(e)),
        }
    }

    async fn update_status(
        &self,
        key: &ObjectKey,
        dummy: &Dummy,
    ) -> std::result::Result<Dummy, StoreError> {
        let data = serde_json::to_vec(dummy)?;
        self.api(&key.namespace)
            .replace_status(&key.name, &PostParams::default(), data)
            .await
            .map_err(StoreError::from_kube)
    }
}
