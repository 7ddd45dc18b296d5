//! Reconcilers for Dummy Operator CRDs
//!
//! This module contains the business logic for reconciling each CRD type,
//! independent of how requests are produced or retried.

pub mod dummy;
