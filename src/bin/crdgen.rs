//! CRD YAML Generator
//!
//! This binary generates the Kubernetes CRD and RBAC manifests for the
//! dummy-operator.
//!
//! Usage: cargo run --bin crdgen > deploy/crds/all.yaml

use dummy_operator::crd::generate_manifests;

fn main() -> anyhow::Result<()> {
    for manifest in generate_manifests()? {
        println!("---");
        print!("{}", manifest);
    }
    Ok(())
}
