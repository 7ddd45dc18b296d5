//! Operator configuration loaded from the process environment

use std::str::FromStr;

use crate::error::{Error, Result};

/// Default metrics port
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "plain" => Ok(LogFormat::Text),
            other => Err(Error::config(format!(
                "Invalid LOG_FORMAT '{}': must be one of: json, text",
                other
            ))),
        }
    }
}

/// Runtime settings for the operator binary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Port for /metrics, /healthz and /readyz
    pub metrics_port: u16,

    /// Restrict the watch to one namespace (None = all namespaces)
    pub watch_namespace: Option<String>,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
            log_format: LogFormat::default(),
        }
    }
}

impl OperatorConfig {
    /// Read `METRICS_PORT`, `WATCH_NAMESPACE` and `LOG_FORMAT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("METRICS_PORT") {
            config.metrics_port = port.trim().parse().map_err(|e| {
                Error::config(format!("Invalid METRICS_PORT '{}': {}", port, e))
            })?;
        }

        config.watch_namespace = lookup("WATCH_NAMESPACE")
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty());

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.trim().parse()?;
        }

        Ok(config)
    }
}
