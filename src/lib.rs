//! Shared library for `IntelliPlan`
//! Contains the selection, generation and constraint-chain engine used by the CLI

pub mod core;
pub mod logger;

pub use self::core::{config, get_version};
