// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Installer configuration
//!
//! Defaults match a stock Service Catalog install. A YAML file passed with
//! `--config` may override any field; command-line flags win over both.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{ScError, ScResult};

/// Installer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Namespace Service Catalog is installed into
    pub namespace: String,

    /// Name of the Service Catalog API server service
    pub api_server_service_name: String,

    /// Remove the generated TLS assets after a successful install
    pub cleanup_temp_dir_on_success: bool,

    /// Name of the ClusterServiceBroker registered for GCP
    pub broker_name: String,

    /// Broker URL; `{project}` is replaced by the active GCP project
    pub broker_url_template: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            namespace: "service-catalog".to_string(),
            api_server_service_name: "service-catalog-api".to_string(),
            cleanup_temp_dir_on_success: false,
            broker_name: "gcp-broker".to_string(),
            broker_url_template:
                "https://servicebroker.googleapis.com/v1beta1/projects/{project}".to_string(),
        }
    }
}

impl InstallConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> ScResult<Self> {
        if !path.exists() {
            return Err(ScError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ScError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> ScResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> ScResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Override the namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        if let Some(ns) = namespace {
            self.namespace = ns;
        }
        self
    }

    /// Hostnames the API server certificate must be valid for
    pub fn api_server_hostnames(&self) -> Vec<String> {
        let base = format!("{}.{}", self.api_server_service_name, self.namespace);
        vec![base.clone(), format!("{}.svc", base)]
    }

    /// Name of the TLS secret holding the API server certificate
    pub fn api_server_secret_name(&self) -> String {
        format!("{}-cert", self.api_server_service_name)
    }

    /// Broker URL for a GCP project
    pub fn broker_url(&self, project: &str) -> String {
        self.broker_url_template.replace("{project}", project)
    }

    fn validate(&self) -> ScResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(ScError::InvalidConfig {
                reason: "namespace must not be empty".into(),
            });
        }
        if self.api_server_service_name.trim().is_empty() {
            return Err(ScError::InvalidConfig {
                reason: "api_server_service_name must not be empty".into(),
            });
        }
        if self.broker_name.trim().is_empty() {
            return Err(ScError::InvalidConfig {
                reason: "broker_name must not be empty".into(),
            });
        }
        Ok(())
    }
}
