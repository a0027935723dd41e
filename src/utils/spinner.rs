// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Progress spinner utilities
//!
//! Provides progress indicators for steps that wait on external tools.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Step list for a multi-step command
///
/// The running step shows a spinner; once it ends the spinner is cleared and a
/// permanent ✓, ✗ or ○ line is printed in its place. Nothing already printed
/// is rewritten, so log lines emitted during a step stay intact.
pub struct StageProgress {
    stages: Vec<String>,
    current: usize,
    spinner: Option<ProgressBar>,
}

impl StageProgress {
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            stages,
            current: 0,
            spinner: None,
        }
    }

    /// Show the current step as running
    pub fn start(&mut self) {
        self.clear();
        if let Some(stage) = self.stages.get(self.current) {
            self.spinner = Some(create_spinner(&format!("{}...", stage)));
        }
    }

    /// Mark the current step done and move to the next
    pub fn complete(&mut self) {
        self.clear();
        if let Some(stage) = self.stages.get(self.current) {
            println!("  {} {}", "✓".green(), stage);
        }
        self.current += 1;
    }

    /// Mark the current step failed; the step does not advance
    pub fn fail(&mut self, error: &str) {
        self.clear();
        if let Some(stage) = self.stages.get(self.current) {
            println!("  {} {} - {}", "✗".red(), stage, error.dimmed());
        }
    }

    pub fn skip(&mut self) {
        self.clear();
        if let Some(stage) = self.stages.get(self.current) {
            println!("  {} {} (skipped)", "○".dimmed(), stage.dimmed());
        }
        self.current += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.stages.len()
    }

    /// Whether a step is currently showing its spinner
    pub fn is_running(&self) -> bool {
        self.spinner.is_some()
    }

    fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for StageProgress {
    fn drop(&mut self) {
        self.clear();
    }
}
