// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! TLS assets for the Service Catalog API server
//!
//! A self-signed CA and a serving certificate are produced by piping
//! `cfssl gencert` into `cfssljson -bare`, which writes `<prefix>.pem` and
//! `<prefix>-key.pem` into the asset directory.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{run_tool, Toolchain};
use crate::config::InstallConfig;
use crate::errors::{ScError, ScResult};
use crate::process::ProcessSpec;

const CA_CSR_FILE: &str = "ca-csr.json";
const SERVER_CSR_FILE: &str = "server-csr.json";
const CA_CONFIG_FILE: &str = "ca-config.json";
const CA_PREFIX: &str = "ca";
const SERVER_PREFIX: &str = "apiserver";
const SIGNING_PROFILE: &str = "server";

/// cfssl certificate signing request
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRequest {
    #[serde(rename = "CN")]
    pub common_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    pub key: KeyRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyRequest {
    pub algo: String,
    pub size: u32,
}

impl Default for KeyRequest {
    fn default() -> Self {
        Self {
            algo: "rsa".into(),
            size: 2048,
        }
    }
}

#[derive(Debug, Serialize)]
struct SigningConfig {
    signing: Signing,
}

#[derive(Debug, Serialize)]
struct Signing {
    default: SigningProfile,
    profiles: std::collections::BTreeMap<String, SigningProfile>,
}

#[derive(Debug, Clone, Serialize)]
struct SigningProfile {
    expiry: String,
    usages: Vec<String>,
}

impl SigningConfig {
    fn server() -> Self {
        let profile = SigningProfile {
            expiry: "8760h".into(),
            usages: vec![
                "signing".into(),
                "key encipherment".into(),
                "server auth".into(),
            ],
        };
        Self {
            signing: Signing {
                default: profile.clone(),
                profiles: [(SIGNING_PROFILE.to_string(), profile)].into_iter().collect(),
            },
        }
    }
}

/// Generated certificate files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsAssets {
    pub dir: PathBuf,
    pub ca_cert: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
}

impl TlsAssets {
    fn in_dir(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            ca_cert: dir.join(format!("{}.pem", CA_PREFIX)),
            server_cert: dir.join(format!("{}.pem", SERVER_PREFIX)),
            server_key: dir.join(format!("{}-key.pem", SERVER_PREFIX)),
        }
    }
}

/// Write the CSR and signing config files cfssl reads
pub fn write_requests(dir: &Path, config: &InstallConfig) -> ScResult<()> {
    let ca = CertificateRequest {
        common_name: format!("{}-ca", config.api_server_service_name),
        hosts: Vec::new(),
        key: KeyRequest::default(),
    };
    let server = CertificateRequest {
        common_name: config.api_server_service_name.clone(),
        hosts: config.api_server_hostnames(),
        key: KeyRequest::default(),
    };

    write_json(&dir.join(CA_CSR_FILE), &ca)?;
    write_json(&dir.join(SERVER_CSR_FILE), &server)?;
    write_json(&dir.join(CA_CONFIG_FILE), &SigningConfig::server())
}

/// `cfssl gencert -initca ca-csr.json | cfssljson -bare ca`
pub fn ca_pipeline(tools: &Toolchain, dir: &Path) -> Vec<ProcessSpec> {
    vec![
        ProcessSpec::new(&tools.cfssl)
            .args(["gencert", "-initca", CA_CSR_FILE])
            .current_dir(dir),
        ProcessSpec::new(&tools.cfssljson)
            .args(["-bare", CA_PREFIX])
            .current_dir(dir),
    ]
}

/// Sign the API server certificate with the generated CA
pub fn server_pipeline(tools: &Toolchain, dir: &Path, hostnames: &[String]) -> Vec<ProcessSpec> {
    vec![
        ProcessSpec::new(&tools.cfssl)
            .arg("gencert")
            .arg(format!("-ca={}.pem", CA_PREFIX))
            .arg(format!("-ca-key={}-key.pem", CA_PREFIX))
            .arg(format!("-config={}", CA_CONFIG_FILE))
            .arg(format!("-profile={}", SIGNING_PROFILE))
            .arg(format!("-hostname={}", hostnames.join(",")))
            .arg(SERVER_CSR_FILE)
            .current_dir(dir),
        ProcessSpec::new(&tools.cfssljson)
            .args(["-bare", SERVER_PREFIX])
            .current_dir(dir),
    ]
}

/// Generate the CA and API server certificate into `dir`
pub async fn generate(tools: &Toolchain, dir: &Path, config: &InstallConfig) -> ScResult<TlsAssets> {
    write_requests(dir, config)?;

    run_tool(ca_pipeline(tools, dir)).await?;
    run_tool(server_pipeline(tools, dir, &config.api_server_hostnames())).await?;

    let assets = TlsAssets::in_dir(dir);
    for file in [&assets.ca_cert, &assets.server_cert, &assets.server_key] {
        if !file.exists() {
            return Err(ScError::FileReadError {
                path: file.clone(),
                error: "cfssljson did not produce this file".into(),
            });
        }
    }

    Ok(assets)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ScResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|e| ScError::FileWriteError {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}
