//! Planning engine shared by every front end

pub mod chain;
pub mod config;
pub mod cursor;
pub mod error;
pub mod models;
pub mod selection;
pub mod service;
pub mod session;

pub use error::{EngineError, Operation, ServiceError};
pub use session::Session;

/// Returns the current version of the `IntelliPlan` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
