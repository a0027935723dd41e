// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! External process execution
//!
//! [`ProcessSpec`] describes an invocation; [`run_pipeline`] chains several of
//! them with Unix pipeline semantics.

mod runner;
mod spec;

pub use runner::{run_pipeline, run_single, PipelineOutput, PipelineResult};
pub use spec::{describe_pipeline, ProcessSpec, StdinSource};
