// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Terminal color utilities
//!
//! Provides consistent status markers across the CLI.

use colored::Colorize;

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}

/// Print captured tool output, dimmed and indented
pub fn print_tool_output(output: &str) {
    for line in output.lines() {
        eprintln!("    {}", line.dimmed());
    }
}
