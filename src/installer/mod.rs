// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Service Catalog install steps
//!
//! Each step drives the external tools through the process pipeline. Which
//! manifests get applied is up to the caller; sc only prepares the namespace
//! and the API server certificate around them.

pub mod broker;
pub mod kubectl;
pub mod tls;

pub use tls::TlsAssets;

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::InstallConfig;
use crate::deps::{CFSSLJSON_BINARY, CFSSL_BINARY, GCLOUD_BINARY, KUBECTL_BINARY};
use crate::errors::{ScError, ScResult};
use crate::process::{run_pipeline, PipelineOutput, ProcessSpec};

/// Programs used for each external tool
///
/// Each entry is a bare name looked up on `PATH` or a path to the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub kubectl: OsString,
    pub gcloud: OsString,
    pub cfssl: OsString,
    pub cfssljson: OsString,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            kubectl: KUBECTL_BINARY.into(),
            gcloud: GCLOUD_BINARY.into(),
            cfssl: CFSSL_BINARY.into(),
            cfssljson: CFSSLJSON_BINARY.into(),
        }
    }
}

impl Toolchain {
    /// Programs in the order they are checked
    pub fn programs(&self) -> [&OsStr; 4] {
        [
            self.gcloud.as_os_str(),
            self.kubectl.as_os_str(),
            self.cfssl.as_os_str(),
            self.cfssljson.as_os_str(),
        ]
    }

    /// Use the tools found in `dir` instead of the search path
    pub fn in_dir(dir: &Path) -> Self {
        let program = |name: &str| dir.join(name).into_os_string();
        Self {
            kubectl: program(KUBECTL_BINARY),
            gcloud: program(GCLOUD_BINARY),
            cfssl: program(CFSSL_BINARY),
            cfssljson: program(CFSSLJSON_BINARY),
        }
    }
}

/// Run a pipeline of tool invocations and require success
///
/// A stage that exits non-zero is reported as [`ScError::CommandFailed`],
/// keeping its stage index and exit reason along with the standard error of
/// the whole invocation. Start failures are passed through unchanged.
pub async fn run_tool(stages: Vec<ProcessSpec>) -> ScResult<PipelineOutput> {
    let result = run_pipeline(stages).await;
    match result.error {
        None => Ok(PipelineOutput {
            stdout: result.output,
            stderr: result.stderr,
        }),
        Some(ScError::StageWaitFailure {
            stage,
            program,
            reason,
        }) => Err(ScError::command_failed(
            tool_name(&program),
            stage,
            reason,
            &result.stderr,
        )),
        Some(e) => Err(e),
    }
}

fn tool_name(program: &str) -> &str {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
}

/// Temporary directory for generated TLS assets
pub fn asset_dir() -> ScResult<TempDir> {
    tempfile::Builder::new()
        .prefix("service-catalog-")
        .tempdir()
        .map_err(Into::into)
}

/// Keep or drop the asset directory once the install finished
///
/// Assets are kept after a failure so they can be inspected. Returns the
/// kept path, if any.
pub fn finish_asset_dir(dir: TempDir, succeeded: bool, cleanup_on_success: bool) -> Option<PathBuf> {
    if succeeded && cleanup_on_success {
        debug!("removing {}", dir.path().display());
        None
    } else {
        let kept = dir.keep();
        info!("TLS assets kept in {}", kept.display());
        Some(kept)
    }
}

/// Create the Service Catalog namespace
pub async fn create_namespace(tools: &Toolchain, config: &InstallConfig) -> ScResult<()> {
    run_tool(vec![kubectl::create_namespace(tools, &config.namespace)])
        .await
        .map(|_| ())
}

/// Store the API server certificate as a TLS secret
pub async fn store_certificate(
    tools: &Toolchain,
    config: &InstallConfig,
    assets: &TlsAssets,
) -> ScResult<()> {
    let spec = kubectl::create_tls_secret(
        tools,
        &config.namespace,
        &config.api_server_secret_name(),
        &assets.server_cert,
        &assets.server_key,
    );
    run_tool(vec![spec]).await.map(|_| ())
}

/// Apply the manifests found in `dir`
pub async fn apply_manifests(tools: &Toolchain, config: &InstallConfig, dir: &Path) -> ScResult<()> {
    if !dir.is_dir() {
        return Err(ScError::FileReadError {
            path: dir.to_path_buf(),
            error: "manifest directory does not exist".into(),
        });
    }

    run_tool(vec![kubectl::apply_dir(tools, &config.namespace, dir)])
        .await
        .map(|_| ())
}

/// Remove Service Catalog from the cluster
///
/// Resources from `manifests` are deleted first, then the namespace.
pub async fn uninstall(
    tools: &Toolchain,
    config: &InstallConfig,
    manifests: Option<&Path>,
) -> ScResult<()> {
    if let Some(dir) = manifests {
        run_tool(vec![kubectl::delete_dir(tools, &config.namespace, dir)]).await?;
    }

    run_tool(vec![kubectl::delete_namespace(tools, &config.namespace)])
        .await
        .map(|_| ())
}
