//! Dummy Kubernetes Operator
//!
//! Main entry point for the operator. Sets up the Kubernetes client,
//! registers the Dummy controller, and runs the reconciliation loop.

use std::sync::Arc;

use kube::Client;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dummy_operator::{
    config::{LogFormat, OperatorConfig},
    controllers::{self, Context},
    metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = OperatorConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting Dummy Operator");

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes API server");

    let shutdown = CancellationToken::new();
    let context = Arc::new(Context::new(client.clone(), shutdown.clone()));

    let metrics_handle = tokio::spawn(metrics::serve(config.metrics_port));
    info!("Metrics server starting on port {}", config.metrics_port);

    // The controller drains on the same signal; cancelling the token makes
    // reconciles caught mid-drain abort their store calls
    let shutdown_trigger = controllers::cancel_on(shutdown_signal(), shutdown.clone());

    let dummy_controller = controllers::run_dummy_controller(client, context, &config);

    tokio::select! {
        result = dummy_controller => {
            match result {
                Ok(()) => info!("Dummy controller stopped"),
                Err(e) => error!(error = %e, "Dummy controller failed"),
            }
        }
        _ = metrics_handle => {
            error!("Metrics server exited unexpectedly");
        }
    }

    shutdown.cancel();
    shutdown_trigger.abort();
    metrics::OPERATOR_HEALTH.set(0.0);

    info!("Dummy Operator stopped");
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
