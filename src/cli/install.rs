// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Install command - set up Service Catalog in the cluster

use colored::Colorize;
use miette::Result;
use std::future::Future;
use std::path::{Path, PathBuf};

use super::check::report_missing;
use super::Context;
use crate::deps::check_dependencies;
use crate::errors::{RecoverySuggestion, ScResult};
use crate::installer::{self, tls};
use crate::utils::{print_header, print_info, print_tool_output, StageProgress};

/// Run the install command
pub async fn run(
    mut ctx: Context,
    namespace: Option<String>,
    manifests: Option<PathBuf>,
    cleanup: bool,
) -> Result<()> {
    ctx.config = ctx.config.with_namespace(namespace);
    if cleanup {
        ctx.config.cleanup_temp_dir_on_success = true;
    }

    if let Err(e) = check_dependencies(&ctx.tools.programs()) {
        println!("{}", "Service Catalog could not be installed".red().bold());
        report_missing(&e);
        return Err(e.into());
    }

    print_header(&format!(
        "Installing Service Catalog into namespace '{}'",
        ctx.config.namespace
    ));

    let (kept, outcome) = install(&ctx, manifests.as_deref()).await?;

    println!();
    if let Some(ref path) = kept {
        print_info(&format!("TLS assets: {}", path.display()));
    }

    match outcome {
        Ok(()) => {
            println!("{}", "Service Catalog installed successfully.".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "Service Catalog could not be installed".red().bold());
            if let Some(stderr) = e.stderr() {
                print_tool_output(stderr);
            }
            if ctx.verbose {
                eprint!("{}", RecoverySuggestion::check_cluster_access());
            }
            Err(e.into())
        }
    }
}

/// Run the install steps in a fresh asset directory
///
/// Returns the asset directory if it was kept, along with the step outcome.
async fn install(
    ctx: &Context,
    manifests: Option<&Path>,
) -> ScResult<(Option<PathBuf>, ScResult<()>)> {
    let dir = installer::asset_dir()?;
    let outcome = install_steps(ctx, dir.path(), manifests).await;
    let kept = installer::finish_asset_dir(
        dir,
        outcome.is_ok(),
        ctx.config.cleanup_temp_dir_on_success,
    );
    Ok((kept, outcome))
}

async fn install_steps(ctx: &Context, dir: &Path, manifests: Option<&Path>) -> ScResult<()> {
    let tools = &ctx.tools;
    let config = &ctx.config;

    let mut progress = StageProgress::new(vec![
        "Generating TLS assets".to_string(),
        format!("Creating namespace {}", config.namespace),
        "Storing API server certificate".to_string(),
        "Applying manifests".to_string(),
    ]);

    let assets = tracked(&mut progress, tls::generate(tools, dir, config)).await?;
    tracked(&mut progress, installer::create_namespace(tools, config)).await?;
    tracked(&mut progress, installer::store_certificate(tools, config, &assets)).await?;

    match manifests {
        Some(manifests) => {
            tracked(
                &mut progress,
                installer::apply_manifests(tools, config, manifests),
            )
            .await?
        }
        None => progress.skip(),
    }

    Ok(())
}

async fn tracked<T, F>(progress: &mut StageProgress, step: F) -> ScResult<T>
where
    F: Future<Output = ScResult<T>>,
{
    progress.start();
    match step.await {
        Ok(value) => {
            progress.complete();
            Ok(value)
        }
        Err(e) => {
            progress.fail(&e.to_string());
            Err(e)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::InstallConfig;
    use crate::errors::ScError;
    use crate::installer::test_support::{fake_tool, fake_toolchain, kubectl_calls};
    use std::fs;
    use tempfile::TempDir;

    fn context(tools_dir: &Path, cleanup: bool) -> Context {
        let mut config = InstallConfig::default();
        config.cleanup_temp_dir_on_success = cleanup;
        Context {
            config,
            tools: fake_toolchain(tools_dir),
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_install_runs_steps_in_order() {
        let tools_dir = TempDir::new().unwrap();
        let manifests = TempDir::new().unwrap();
        let ctx = context(tools_dir.path(), false);

        let (kept, outcome) = install(&ctx, Some(manifests.path())).await.unwrap();
        outcome.unwrap();

        let calls = kubectl_calls(tools_dir.path());
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], "create namespace service-catalog");
        assert!(calls[1].starts_with("create secret tls service-catalog-api-cert"));
        assert_eq!(
            calls[2],
            format!("apply --namespace service-catalog -f {}", manifests.path().display())
        );

        let kept = kept.expect("assets are kept without cleanup");
        assert!(kept.join("apiserver.pem").exists());
        fs::remove_dir_all(kept).unwrap();
    }

    #[tokio::test]
    async fn test_install_without_manifests_skips_apply() {
        let tools_dir = TempDir::new().unwrap();
        let ctx = context(tools_dir.path(), true);

        let (kept, outcome) = install(&ctx, None).await.unwrap();
        outcome.unwrap();

        assert!(kept.is_none());
        assert_eq!(kubectl_calls(tools_dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_failed_install_keeps_assets() {
        let tools_dir = TempDir::new().unwrap();
        let mut ctx = context(tools_dir.path(), true);
        fake_tool(tools_dir.path(), "kubectl-broken", "echo 'AlreadyExists' >&2; exit 1");
        ctx.tools.kubectl = tools_dir.path().join("kubectl-broken").into_os_string();

        let (kept, outcome) = install(&ctx, None).await.unwrap();

        assert!(matches!(outcome, Err(ScError::CommandFailed { .. })));
        let kept = kept.expect("assets are kept after a failure");
        assert!(kept.join("ca.pem").exists());
        fs::remove_dir_all(kept).unwrap();
    }
}
