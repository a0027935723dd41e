// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! kubectl invocations

use std::path::Path;

use super::Toolchain;
use crate::process::{ProcessSpec, StdinSource};

/// `kubectl create namespace <ns>`
pub fn create_namespace(tools: &Toolchain, namespace: &str) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl).args(["create", "namespace", namespace])
}

/// `kubectl delete namespace <ns>`, tolerating an absent namespace
pub fn delete_namespace(tools: &Toolchain, namespace: &str) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl).args(["delete", "namespace", namespace, "--ignore-not-found"])
}

/// Store a certificate/key pair as a TLS secret
pub fn create_tls_secret(
    tools: &Toolchain,
    namespace: &str,
    name: &str,
    cert: &Path,
    key: &Path,
) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl)
        .args(["create", "secret", "tls", name])
        .arg(format!("--cert={}", cert.display()))
        .arg(format!("--key={}", key.display()))
        .args(["--namespace", namespace])
}

/// Apply every manifest in a directory
pub fn apply_dir(tools: &Toolchain, namespace: &str, dir: &Path) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl)
        .args(["apply", "--namespace", namespace, "-f"])
        .arg(dir)
}

/// Delete every resource described by the manifests in a directory
pub fn delete_dir(tools: &Toolchain, namespace: &str, dir: &Path) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl)
        .args(["delete", "--ignore-not-found", "--namespace", namespace, "-f"])
        .arg(dir)
}

/// `kubectl apply -f -`, reading manifests from standard input
///
/// When this is the first stage of a pipeline, `manifest` is its input.
pub fn apply_stdin(tools: &Toolchain, manifest: Option<Vec<u8>>) -> ProcessSpec {
    let spec = ProcessSpec::new(&tools.kubectl).args(["apply", "-f", "-"]);
    match manifest {
        Some(bytes) => spec.stdin(StdinSource::Bytes(bytes)),
        None => spec,
    }
}

/// Remove a cluster-scoped service broker
pub fn delete_cluster_service_broker(tools: &Toolchain, name: &str) -> ProcessSpec {
    ProcessSpec::new(&tools.kubectl).args(["delete", "clusterservicebrokers", name])
}
