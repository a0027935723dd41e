// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Error types
//!
//! Every failure in sc is returned to the caller as an [`ScError`]; nothing is
//! retried or swallowed. The CLI renders these through miette.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sc operations
pub type ScResult<T> = Result<T, ScError>;

/// Main error type for sc
#[derive(Error, Debug, Diagnostic)]
pub enum ScError {
    // ─────────────────────────────────────────────────────────────────────────
    // Dependency Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("{} commands not found in the PATH", .names.join(","))]
    #[diagnostic(
        code(sc::missing_binaries),
        help("Install the missing commands and make sure they are on your PATH")
    )]
    MissingBinaries { names: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Stage {stage} ('{program}') failed to start: {source}")]
    #[diagnostic(
        code(sc::stage_start_failure),
        help("Check that '{program}' exists and is executable")
    )]
    StageStartFailure {
        stage: usize,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stage {stage} ('{program}') failed: {reason}")]
    #[diagnostic(code(sc::stage_wait_failure))]
    StageWaitFailure {
        stage: usize,
        program: String,
        reason: String,
    },

    #[error("Command '{program}' failed: {reason}")]
    #[diagnostic(code(sc::command_failed))]
    CommandFailed {
        program: String,
        /// Pipeline stage the command ran as
        stage: usize,
        /// Exit status or other cause
        reason: String,
        /// Standard error of every stage of the invocation
        stderr: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Config file not found: {path}")]
    #[diagnostic(
        code(sc::config_not_found),
        help("Pass an existing YAML file to --config or omit it to use defaults")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(sc::invalid_config))]
    InvalidConfig { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(sc::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(sc::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(sc::io_error))]
    Io { message: String },

    #[error("YAML error: {message}")]
    #[diagnostic(code(sc::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(sc::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for ScError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ScError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ScError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl ScError {
    /// Create a missing binaries error from any list of names
    pub fn missing_binaries<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingBinaries {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a command failed error with a hint derived from its stderr
    pub fn command_failed(
        program: &str,
        stage: usize,
        reason: impl Into<String>,
        stderr: &[u8],
    ) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        let help = Self::generate_help_for_tool_error(program, &stderr);
        Self::CommandFailed {
            program: program.to_string(),
            stage,
            reason: reason.into(),
            stderr,
            help,
        }
    }

    /// Standard error captured from the failing tool, if any
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }

    fn generate_help_for_tool_error(program: &str, stderr: &str) -> Option<String> {
        match program {
            "kubectl" => Self::parse_kubectl_error(stderr),
            "gcloud" => Self::parse_gcloud_error(stderr),
            _ => None,
        }
    }

    fn parse_kubectl_error(stderr: &str) -> Option<String> {
        if stderr.contains("connection refused") || stderr.contains("Unable to connect") {
            Some("kubectl cannot reach the cluster. Check your current kubeconfig context.".into())
        } else if stderr.contains("Forbidden") {
            Some("Your cluster user lacks permission for this operation.".into())
        } else if stderr.contains("AlreadyExists") {
            Some("The resource already exists. Run 'sc uninstall' first to start clean.".into())
        } else {
            None
        }
    }

    fn parse_gcloud_error(stderr: &str) -> Option<String> {
        if stderr.contains("gcloud auth login") {
            Some("Authenticate first with 'gcloud auth login'.".into())
        } else if stderr.contains("project") {
            Some("Set a default project with 'gcloud config set project <id>'.".into())
        } else {
            None
        }
    }
}
