// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Broker commands - add or remove the GCP service broker

use colored::Colorize;
use miette::Result;

use super::Context;
use crate::installer::broker;
use crate::utils::{create_spinner, print_info, print_tool_output};

/// Run the add-gcp-broker command
pub async fn add(ctx: &Context) -> Result<()> {
    let spinner = create_spinner("Adding GCP broker...");
    let outcome = broker::add(&ctx.tools, &ctx.config).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(project) => {
            if ctx.verbose {
                print_info(&format!("project: {}", project));
                print_info(&format!("broker URL: {}", ctx.config.broker_url(&project)));
            }
            println!("{}", "GCP broker added successfully.".green());
            Ok(())
        }
        Err(e) => {
            println!("{}", "failed to configure GCP broker".red().bold());
            if let Some(stderr) = e.stderr() {
                print_tool_output(stderr);
            }
            Err(e.into())
        }
    }
}

/// Run the remove-gcp-broker command
pub async fn remove(ctx: &Context) -> Result<()> {
    let spinner = create_spinner("Removing GCP broker...");
    let outcome = broker::remove(&ctx.tools, &ctx.config).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(()) => {
            println!("{}", "GCP broker removed successfully.".green());
            Ok(())
        }
        Err(e) => {
            println!("{}", "failed to remove GCP broker".red().bold());
            if let Some(stderr) = e.stderr() {
                print_tool_output(stderr);
            }
            Err(e.into())
        }
    }
}
