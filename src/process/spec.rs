// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Process specifications
//!
//! A [`ProcessSpec`] describes one external invocation. It is built right
//! before a pipeline runs and consumed by it.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use tokio::process::Command;

/// Where the first stage of a pipeline reads its standard input from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StdinSource {
    /// Empty input (`/dev/null`)
    #[default]
    Null,
    /// The invoking process's own standard input
    Inherit,
    /// Bytes written to the stage by the runner, then closed
    Bytes(Vec<u8>),
    /// Contents of a file
    File(PathBuf),
}

/// One external process invocation
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Program name (resolved on `PATH`) or path
    pub program: OsString,

    /// Arguments
    pub args: Vec<OsString>,

    /// Standard input; only honored on the first stage of a pipeline
    pub stdin: StdinSource,

    /// Working directory for the process
    pub current_dir: Option<PathBuf>,

    /// Extra environment variables
    pub env: Vec<(OsString, OsString)>,
}

impl ProcessSpec {
    /// Create a spec for `program` with no arguments
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: StdinSource::Null,
            current_dir: None,
            env: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the standard input source
    pub fn stdin(mut self, stdin: StdinSource) -> Self {
        self.stdin = stdin;
        self
    }

    /// Run the process in `dir`
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Build the tokio command without any stdio configuration
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
        cmd.kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Render a pipeline the way a shell would show it
pub fn describe_pipeline(stages: &[ProcessSpec]) -> String {
    stages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}
