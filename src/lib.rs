// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! # sc - Service Catalog installer
//!
//! `sc` installs and uninstalls Service Catalog in a Kubernetes cluster and
//! registers the GCP service broker with it. It drives `kubectl`, `gcloud`,
//! `cfssl` and `cfssljson`.
//!
//! ## Features
//!
//! - **Dependency check** - Report every missing tool in one pass
//! - **Process pipelines** - Chain tools like `cfssl gencert | cfssljson -bare`
//! - **TLS assets** - Generate the API server certificate and store it as a secret
//!
//! ## Quick Start
//!
//! ```bash
//! # Check required tools
//! sc check
//!
//! # Install, applying your Service Catalog manifests
//! sc install --manifests ./service-catalog
//!
//! # Register the GCP broker
//! sc add-gcp-broker
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod errors;
pub mod installer;
pub mod process;
pub mod utils;

// Re-export commonly used types
pub use config::InstallConfig;
pub use deps::{check_dependencies, REQUIRED_BINARIES};
pub use errors::{ScError, ScResult};
pub use process::{run_pipeline, PipelineResult, ProcessSpec, StdinSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
