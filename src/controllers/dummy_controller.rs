//! Dummy controller
//!
//! Watches Dummy resources and triggers reconciliation.

use std::sync::Arc;

use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller, Error as ControllerError},
        reflector::ObjectRef,
        watcher::Config as WatcherConfig,
    },
    Api, Client, ResourceExt,
};
use tracing::{error, info, instrument, warn};

use crate::client::ObjectKey;
use crate::config::OperatorConfig;
use crate::controllers::Context;
use crate::crd::Dummy;
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::dummy as dummy_reconciler;

const KIND: &str = "Dummy";

/// Run the Dummy controller until the watch stream ends
pub async fn run(client: Client, context: Arc<Context>, config: &OperatorConfig) -> Result<()> {
    let api: Api<Dummy> = match &config.watch_namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("Dummy CRD not installed: {}", e);
        return Err(e.into());
    }

    info!(
        namespace = config.watch_namespace.as_deref().unwrap_or("*"),
        "Starting Dummy controller"
    );

    let results_ctx = context.clone();
    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| {
            handle_result(&results_ctx, &result);
            futures::future::ready(())
        })
        .await;

    Ok(())
}

/// Log one controller result and drop backoff state for objects that are gone
fn handle_result<QErr: std::error::Error + Send + Sync + 'static>(
    ctx: &Context,
    result: &std::result::Result<(ObjectRef<Dummy>, Action), ControllerError<Error, QErr>>,
) {
    match result {
        Ok((obj, _action)) => {
            info!(
                name = %obj.name,
                namespace = obj.namespace.as_deref().unwrap_or("default"),
                "Reconciled Dummy"
            );
        }
        Err(ControllerError::ObjectNotFound(obj)) => {
            // Deleted while queued; reconcile will never run for it again
            if let Some(namespace) = &obj.namespace {
                ctx.backoff.reset(&ObjectKey::new(namespace.clone(), obj.name.clone()));
            }
            info!(name = %obj.name, "Dummy deleted before reconciliation");
        }
        Err(e) => {
            warn!(error = %e, "Reconciliation error");
        }
    }
}

/// Adapter between the watch loop and the reconciler
///
/// Only the identity of the cached object is used; the reconciler re-reads
/// the object itself.
#[instrument(skip(ctx, obj), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<Dummy>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&[KIND])
        .start_timer();
    metrics::RECONCILIATIONS.with_label_values(&[KIND]).inc();

    let key = ObjectKey::from_resource(obj.as_ref())?;
    let outcome = dummy_reconciler::reconcile(&key, ctx.client.as_ref(), &ctx.shutdown).await?;

    ctx.backoff.reset(&key);
    metrics::RECONCILE_OUTCOMES
        .with_label_values(&[KIND, outcome.as_str()])
        .inc();

    Ok(outcome.action())
}

/// Error policy for the controller
fn error_policy(obj: Arc<Dummy>, error: &Error, ctx: Arc<Context>) -> Action {
    metrics::RECONCILIATION_ERRORS
        .with_label_values(&[KIND, error.metric_label()])
        .inc();

    let key = match ObjectKey::from_resource(obj.as_ref()) {
        Ok(key) => key,
        Err(e) => {
            warn!(name = %obj.name_any(), error = %e, "Cannot schedule retry");
            return Action::await_change();
        }
    };

    if !error.is_retryable() {
        ctx.backoff.reset(&key);
        warn!(key = %key, error = %error, "Reconciliation failed, not retrying");
        return Action::await_change();
    }

    let delay = ctx.backoff.next_delay(&key);
    error!(
        key = %key,
        error = %error,
        retry_in = ?delay,
        "Reconciliation failed, scheduling retry"
    );

    Action::requeue(delay)
}
