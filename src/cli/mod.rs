// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for sc. Handlers receive an explicit
//! [`Context`] built once in `main`.

pub mod broker;
pub mod check;
pub mod install;
pub mod uninstall;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::errors::ScResult;
use crate::installer::Toolchain;

/// Manage Service Catalog in a Kubernetes cluster
///
/// sc installs and uninstalls Service Catalog and adds or removes the GCP
/// service broker. It assumes kubectl is configured to connect to the cluster.
#[derive(Parser, Debug)]
#[clap(
    name = "sc",
    version,
    about = "CLI to manage Service Catalog in a Kubernetes cluster",
    long_about = None,
    after_help = "Examples:\n\
        sc check                           Check that required tools are installed\n\
        sc install --manifests ./catalog   Install Service Catalog\n\
        sc add-gcp-broker                  Register the GCP service broker\n\n\
        See 'sc <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Installer configuration file (YAML)
    #[clap(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform a dependency check
    ///
    /// sc requires cfssl, cfssljson, gcloud and kubectl to be present in PATH.
    Check,

    /// Install Service Catalog in the Kubernetes cluster
    Install {
        /// Namespace to install into
        #[clap(short, long)]
        namespace: Option<String>,

        /// Directory of Service Catalog manifests to apply
        #[clap(short, long, value_name = "DIR")]
        manifests: Option<PathBuf>,

        /// Remove the generated TLS assets after a successful install
        #[clap(long)]
        cleanup: bool,
    },

    /// Uninstall Service Catalog from the Kubernetes cluster
    Uninstall {
        /// Namespace Service Catalog was installed into
        #[clap(short, long)]
        namespace: Option<String>,

        /// Directory of manifests whose resources should be deleted
        #[clap(short, long, value_name = "DIR")]
        manifests: Option<PathBuf>,
    },

    /// Add the GCP broker to Service Catalog
    AddGcpBroker,

    /// Remove the GCP broker from Service Catalog
    RemoveGcpBroker,
}

/// Everything a command handler needs
#[derive(Debug, Clone)]
pub struct Context {
    pub config: InstallConfig,
    pub tools: Toolchain,
    pub verbose: bool,
}

impl Context {
    /// Build the context from parsed arguments
    pub fn from_cli(cli: &Cli) -> ScResult<Self> {
        Ok(Self {
            config: InstallConfig::load(cli.config.as_deref())?,
            tools: Toolchain::default(),
            verbose: cli.verbose,
        })
    }
}

/// Dispatch a parsed command to its handler
pub async fn dispatch(ctx: Context, command: Commands) -> miette::Result<()> {
    match command {
        Commands::Check => check::run(&ctx),
        Commands::Install {
            namespace,
            manifests,
            cleanup,
        } => install::run(ctx, namespace, manifests, cleanup).await,
        Commands::Uninstall {
            namespace,
            manifests,
        } => uninstall::run(ctx, namespace, manifests).await,
        Commands::AddGcpBroker => broker::add(&ctx).await,
        Commands::RemoveGcpBroker => broker::remove(&ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcommand_names() {
        let cli = Cli::try_parse_from(["sc", "add-gcp-broker"]).unwrap();
        assert!(matches!(cli.command, Commands::AddGcpBroker));

        let cli = Cli::try_parse_from(["sc", "remove-gcp-broker", "-v"]).unwrap();
        assert!(matches!(cli.command, Commands::RemoveGcpBroker));
        assert!(cli.verbose);
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::try_parse_from([
            "sc",
            "install",
            "--namespace",
            "catalog",
            "--manifests",
            "deploy",
            "--cleanup",
        ])
        .unwrap();

        match cli.command {
            Commands::Install {
                namespace,
                manifests,
                cleanup,
            } => {
                assert_eq!(namespace.as_deref(), Some("catalog"));
                assert_eq!(manifests, Some(PathBuf::from("deploy")));
                assert!(cleanup);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_context_defaults_without_config() {
        let cli = Cli::try_parse_from(["sc", "check"]).unwrap();
        let ctx = Context::from_cli(&cli).unwrap();
        assert_eq!(ctx.config, InstallConfig::default());
        assert_eq!(ctx.tools.programs(), crate::deps::REQUIRED_BINARIES);
    }

    #[test]
    fn test_context_rejects_missing_config() {
        let cli = Cli::try_parse_from(["sc", "--config", "/nonexistent/sc.yaml", "check"]).unwrap();
        assert!(Context::from_cli(&cli).is_err());
    }
}
