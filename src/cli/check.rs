// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Check command - verify required binaries are installed

use colored::Colorize;
use miette::Result;

use super::Context;
use crate::deps::{check_dependencies, resolve};
use crate::errors::{RecoverySuggestion, ScError};
use crate::utils::{print_error, print_success};

/// Run the check command
pub fn run(ctx: &Context) -> Result<()> {
    let programs = ctx.tools.programs();

    match check_dependencies(&programs) {
        Ok(()) => {
            if ctx.verbose {
                for name in programs {
                    let location = resolve(name)
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    print_success(&format!("{} {}", name.to_string_lossy(), location.dimmed()));
                }
                println!();
            }
            println!("{}", "Dependency check passed. You are good to go.".green());
            Ok(())
        }
        Err(e) => {
            println!("{}", "Dependency check failed".red().bold());
            report_missing(&e);
            Err(e.into())
        }
    }
}

/// Print install hints for every missing binary
pub fn report_missing(err: &ScError) {
    let ScError::MissingBinaries { names } = err else {
        return;
    };

    for name in names {
        print_error(&format!("{} not found", name));
    }
    for name in names {
        eprintln!();
        eprint!("{}", RecoverySuggestion::install_tool(name));
    }
    eprintln!();
}
