//! CLI command handlers for `IntelliPlan`.
//!
//! Each command is implemented in its own submodule.

pub mod catalog;
pub mod config;
pub mod plan;
