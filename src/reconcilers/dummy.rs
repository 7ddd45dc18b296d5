//! Dummy reconciler
//!
//! Copies `spec.message` into `status.specEcho`. The request carries only the
//! object's identity; the object is always re-read from the store so that
//! coalesced or stale notifications converge on the latest state.

use std::future::Future;

use kube::runtime::controller::Action;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{DummyClient, ObjectKey, StoreError};
use crate::crd::{DummySpec, DummyStatus};
use crate::error::{Error, Result};

/// Terminal result of a successful reconcile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Status written and now matches the spec
    Synced,
    /// Object was gone by the time the request was processed
    Deleted,
}

impl Outcome {
    /// Neither outcome asks for a requeue; the next watch event drives the loop
    pub fn action(self) -> Action {
        Action::await_change()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Synced => "synced",
            Outcome::Deleted => "deleted",
        }
    }
}

/// Status the operator wants for a given spec
pub fn desired_status(spec: &DummySpec) -> DummyStatus {
    DummyStatus {
        spec_echo: spec.message.clone(),
    }
}

/// Reconcile one Dummy identified by `key`
///
/// Store failures are returned to the caller, which owns retry scheduling.
pub async fn reconcile(
    key: &ObjectKey,
    client: &dyn DummyClient,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let fetched = cancellable(key, cancel, client.get(key))
        .await?
        .map_err(|source| Error::Fetch {
            key: key.to_string(),
            source,
        })?;

    let Some(mut dummy) = fetched else {
        info!(key = %key, "Dummy no longer exists, nothing to reconcile");
        return Ok(Outcome::Deleted);
    };

    debug!(
        key = %key,
        generation = dummy.metadata.generation.unwrap_or(0),
        message = %dummy.spec.message,
        "Copying spec.message into status.specEcho"
    );

    dummy.status = Some(desired_status(&dummy.spec));

    cancellable(key, cancel, client.update_status(key, &dummy))
        .await?
        .map_err(|e| match e {
            StoreError::Conflict(message) => Error::Conflict {
                key: key.to_string(),
                message,
            },
            source => Error::Persist {
                key: key.to_string(),
                source,
            },
        })?;

    info!(key = %key, "Status synced");
    Ok(Outcome::Synced)
}

/// Race a store call against cancellation, dropping the call if cancelled
async fn cancellable<T>(
    key: &ObjectKey,
    cancel: &CancellationToken,
    call: impl Future<Output = T>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled { key: key.to_string() }),
        out = call => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use kube::core::ErrorResponse;
    use mockall::predicate::eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::client::MockDummyClient;
    use crate::crd::Dummy;

    fn sample(namespace: &str, name: &str, message: &str) -> Dummy {
        let mut dummy = Dummy::new(
            name,
            DummySpec {
                message: message.to_string(),
            },
        );
        dummy.metadata.namespace = Some(namespace.to_string());
        dummy.metadata.resource_version = Some("1".to_string());
        dummy
    }

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "test failure".to_string(),
            reason: "Test".to_string(),
            code,
        })
    }

    #[tokio::test]
    async fn sample_object_gets_echo() {
        let key = ObjectKey::new("default", "sample");

        let mut mock = MockDummyClient::new();
        mock.expect_get()
            .with(eq(key.clone()))
            .times(1)
            .returning(|_| Ok(Some(sample("default", "sample", "hello"))));
        mock.expect_update_status()
            .withf(|key, dummy| {
                key.name == "sample"
                    && dummy.status.as_ref().map(|s| s.spec_echo.as_str()) == Some("hello")
                    && dummy.metadata.resource_version.as_deref() == Some("1")
            })
            .times(1)
            .returning(|_, dummy| Ok(dummy.clone()));

        let outcome = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Synced);
        assert_eq!(outcome.action(), Action::await_change());
    }

    #[tokio::test]
    async fn deleted_object_is_a_no_op() {
        let key = ObjectKey::new("default", "gone");

        let mut mock = MockDummyClient::new();
        mock.expect_get().times(1).returning(|_| Ok(None));
        mock.expect_update_status().never();

        let outcome = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Deleted);
        assert_eq!(outcome.action(), Action::await_change());
    }

    #[tokio::test]
    async fn fetch_failure_is_retryable() {
        let key = ObjectKey::new("default", "sample");

        let mut mock = MockDummyClient::new();
        mock.expect_get()
            .returning(|_| Err(StoreError::Api(api_error(503))));
        mock.expect_update_status().never();

        let err = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn forbidden_fetch_is_not_treated_as_deleted() {
        let key = ObjectKey::new("default", "sample");

        let mut mock = MockDummyClient::new();
        mock.expect_get()
            .returning(|_| Err(StoreError::Api(api_error(403))));

        let err = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn conflict_on_persist_is_surfaced() {
        let key = ObjectKey::new("default", "sample");

        let mut mock = MockDummyClient::new();
        mock.expect_get()
            .returning(|_| Ok(Some(sample("default", "sample", "hello"))));
        mock.expect_update_status()
            .returning(|_, _| Err(StoreError::Conflict("object has been modified".to_string())));

        let err = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict { ref message, .. } if message.contains("modified")));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn persist_failure_is_surfaced() {
        let key = ObjectKey::new("default", "sample");

        let mut mock = MockDummyClient::new();
        mock.expect_get()
            .returning(|_| Ok(Some(sample("default", "sample", "hello"))));
        mock.expect_update_status()
            .returning(|_, _| Err(StoreError::Api(api_error(500))));

        let err = reconcile(&key, &mock, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persist { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn cancelled_context_skips_store_calls() {
        let key = ObjectKey::new("default", "sample");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut mock = MockDummyClient::new();
        mock.expect_get().never();
        mock.expect_update_status().never();

        let err = reconcile(&key, &mock, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_call() {
        let cancel = CancellationToken::new();
        let key = ObjectKey::new("default", "sample");

        let trigger = cancel.clone();
        tokio::spawn(async move { trigger.cancel() });

        let result = cancellable(&key, &cancel, std::future::pending::<()>()).await;
        assert!(matches!(result, Err(Error::Cancelled { .. })));
    }

    /// Store whose reads never complete on their own
    struct StalledStore {
        entered: Arc<Notify>,
    }

    #[async_trait]
    impl DummyClient for StalledStore {
        async fn get(&self, _key: &ObjectKey) -> std::result::Result<Option<Dummy>, StoreError> {
            self.entered.notify_one();
            std::future::pending::<std::result::Result<Option<Dummy>, StoreError>>().await
        }

        async fn update_status(
            &self,
            _key: &ObjectKey,
            dummy: &Dummy,
        ) -> std::result::Result<Dummy, StoreError> {
            Ok(dummy.clone())
        }
    }

    #[tokio::test]
    async fn blocked_fetch_is_aborted_by_cancellation() {
        let key = ObjectKey::new("default", "sample");
        let entered = Arc::new(Notify::new());
        let store = StalledStore {
            entered: entered.clone(),
        };
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            entered.notified().await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), reconcile(&key, &store, &cancel))
            .await
            .expect("reconcile should return once cancelled");
        assert!(matches!(result, Err(Error::Cancelled { .. })));
    }

    #[test]
    fn desired_status_copies_message_verbatim() {
        for message in ["", "  padded  ", "line\nbreak", "<&\"quoted\">", "héllo 世界 🚀"] {
            let spec = DummySpec {
                message: message.to_string(),
            };
            assert_eq!(desired_status(&spec).spec_echo, message);
        }
    }
}
