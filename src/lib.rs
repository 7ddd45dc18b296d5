//! Dummy Kubernetes Operator
//!
//! Watches `Dummy` custom resources and keeps `status.specEcho` in sync with
//! `spec.message`.

pub mod client;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
