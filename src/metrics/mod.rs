//! Prometheus metrics for the Dummy Operator
//!
//! This module exposes metrics for monitoring operator health and reconcile activity.

mod prometheus;

pub use prometheus::*;
