// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 sc contributors

//! Utility modules
//!
//! Terminal output helpers shared by the command handlers.

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
