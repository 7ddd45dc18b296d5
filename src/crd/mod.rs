//! Custom Resource Definitions for the Dummy Operator

mod dummy;

pub use dummy::*;

use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{CustomResourceExt, Resource};

use crate::error::Result;

/// Name of the ClusterRole the operator runs under
pub const CLUSTER_ROLE_NAME: &str = "dummy-operator";

/// ClusterRole granting exactly what the controller needs on `dummies`
pub fn cluster_role() -> ClusterRole {
    let group = Dummy::group(&()).to_string();
    let plural = Dummy::plural(&()).to_string();

    let rule = |resource: String, verbs: &[&str]| PolicyRule {
        api_groups: Some(vec![group.clone()]),
        resources: Some(vec![resource]),
        verbs: verbs.iter().map(|v| v.to_string()).collect(),
        ..Default::default()
    };

    ClusterRole {
        metadata: ObjectMeta {
            name: Some(CLUSTER_ROLE_NAME.to_string()),
            ..Default::default()
        },
        rules: Some(vec![
            rule(
                plural.clone(),
                &["get", "list", "watch", "create", "update", "patch", "delete"],
            ),
            rule(format!("{}/status", plural), &["get", "update", "patch"]),
            rule(format!("{}/finalizers", plural), &["update"]),
        ]),
        ..Default::default()
    }
}

/// Generate the CRD and RBAC YAML manifests
pub fn generate_manifests() -> Result<Vec<String>> {
    Ok(vec![
        serde_yaml::to_string(&Dummy::crd())?,
        serde_yaml::to_string(&cluster_role())?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crd_registers_dummy_kind_with_status_subresource() {
        let crd = Dummy::crd();
        assert_eq!(crd.spec.group, "api.interview.com");
        assert_eq!(crd.spec.names.kind, "Dummy");
        assert_eq!(crd.spec.names.plural, "dummies");
        assert_eq!(crd.spec.scope, "Namespaced");

        let version = &crd.spec.versions[0];
        assert_eq!(version.name, "v1alpha1");
        assert!(version
            .subresources
            .as_ref()
            .and_then(|s| s.status.as_ref())
            .is_some());
    }

    #[test]
    fn cluster_role_covers_status_subresource() {
        let role = cluster_role();
        let rules = role.rules.unwrap();

        let status_rule = rules
            .iter()
            .find(|r| r.resources.as_deref() == Some(&["dummies/status".to_string()][..]))
            .expect("status rule");
        assert_eq!(status_rule.verbs, vec!["get", "update", "patch"]);
        assert_eq!(
            status_rule.api_groups.as_deref(),
            Some(&["api.interview.com".to_string()][..])
        );
    }

    #[test]
    fn manifests_render_as_yaml() {
        let manifests = generate_manifests().unwrap();
        assert_eq!(manifests.len(), 2);
        assert!(manifests[0].contains("kind: CustomResourceDefinition"));
        assert!(manifests[1].contains("kind: ClusterRole"));
    }
}
