//! Dummy Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Dummy resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "api.interview.com",
    version = "v1alpha1",
    kind = "Dummy",
    plural = "dummies",
    singular = "dummy",
    shortname = "dmy",
    namespaced,
    status = "DummyStatus",
    printcolumn = r#"{"name": "Message", "type": "string", "jsonPath": ".spec.message"}"#,
    printcolumn = r#"{"name": "Echo", "type": "string", "jsonPath": ".status.specEcho"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DummySpec {
    /// Message set by the owner of the object
    #[serde(default)]
    pub message: String,
}

/// Dummy status, written only by the operator
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DummyStatus {
    /// Copy of `spec.message` as last reconciled
    #[serde(default)]
    pub spec_echo: String,
}
