// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Uninstall command - remove Service Catalog from the cluster

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::installer;
use crate::utils::{create_spinner, print_tool_output};

/// Run the uninstall command
pub async fn run(mut ctx: Context, namespace: Option<String>, manifests: Option<PathBuf>) -> Result<()> {
    ctx.config = ctx.config.with_namespace(namespace);

    let spinner = create_spinner(&format!(
        "Uninstalling Service Catalog from namespace '{}'...",
        ctx.config.namespace
    ));
    let outcome = installer::uninstall(&ctx.tools, &ctx.config, manifests.as_deref()).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(()) => {
            println!("{}", "Service Catalog uninstalled successfully.".green());
            Ok(())
        }
        Err(e) => {
            println!("{}", "Service Catalog could not be uninstalled".red().bold());
            if let Some(stderr) = e.stderr() {
                print_tool_output(stderr);
            }
            Err(e.into())
        }
    }
}
