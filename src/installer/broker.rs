// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! GCP service broker registration

use serde::Serialize;

use super::{kubectl, run_tool, Toolchain};
use crate::config::InstallConfig;
use crate::errors::{ScError, ScResult};
use crate::process::ProcessSpec;

const SERVICE_CATALOG_API_VERSION: &str = "servicecatalog.k8s.io/v1beta1";

/// ClusterServiceBroker resource
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceBroker {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: BrokerSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokerSpec {
    pub url: String,
}

impl ClusterServiceBroker {
    /// Broker resource for a GCP project
    pub fn for_project(config: &InstallConfig, project: &str) -> Self {
        Self {
            api_version: SERVICE_CATALOG_API_VERSION.into(),
            kind: "ClusterServiceBroker".into(),
            metadata: Metadata {
                name: config.broker_name.clone(),
            },
            spec: BrokerSpec {
                url: config.broker_url(project),
            },
        }
    }

    /// Render as a YAML manifest
    pub fn to_yaml(&self) -> ScResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }
}

/// `gcloud config get-value project`
pub fn active_project_command(tools: &Toolchain) -> ProcessSpec {
    ProcessSpec::new(&tools.gcloud).args(["config", "get-value", "project"])
}

/// Look up the active GCP project
pub async fn active_project(tools: &Toolchain) -> ScResult<String> {
    let output = run_tool(vec![active_project_command(tools)]).await?;
    let project = output.stdout_lossy().trim().to_string();

    if project.is_empty() {
        return Err(ScError::CommandFailed {
            program: tools.gcloud.to_string_lossy().into_owned(),
            stage: 0,
            reason: "no active project".into(),
            stderr: output.stderr_lossy().trim().to_string(),
            help: Some("Set a default project with 'gcloud config set project <id>'.".into()),
        });
    }

    Ok(project)
}

/// Register the GCP broker for the active project
pub async fn add(tools: &Toolchain, config: &InstallConfig) -> ScResult<String> {
    let project = active_project(tools).await?;
    let manifest = ClusterServiceBroker::for_project(config, &project).to_yaml()?;

    tracing::debug!("applying broker manifest:\n{}", manifest);
    run_tool(vec![kubectl::apply_stdin(tools, Some(manifest.into_bytes()))]).await?;

    Ok(project)
}

/// Remove the GCP broker
pub async fn remove(tools: &Toolchain, config: &InstallConfig) -> ScResult<()> {
    run_tool(vec![kubectl::delete_cluster_service_broker(
        tools,
        &config.broker_name,
    )])
    .await
    .map(|_| ())
}
