//! Error types for the planning engine
//!
//! Every failure is session-local and recoverable. An operation that returns
//! an error has committed nothing.

use std::fmt;

/// Failure reported by the scheduling service or the transport to it.
///
/// `message` is the service's own detail text when it supplied one, otherwise
/// a generic message chosen by the calling operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Human-readable message shown to the user
    pub message: String,
    /// HTTP status when the failure came from a response
    pub status: Option<u16>,
    /// Whether `message` is the service's own text
    pub verbatim: bool,
}

impl ServiceError {
    /// Error carrying a message and no status
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            verbatim: false,
        }
    }

    /// Use the service's detail when present and non-blank, else `fallback`
    #[must_use]
    pub fn from_detail(detail: Option<String>, fallback: &str) -> Self {
        match detail.filter(|d| !d.trim().is_empty()) {
            Some(detail) => Self {
                verbatim: true,
                ..Self::new(detail)
            },
            None => Self::new(fallback),
        }
    }

    /// Replace a generic message with `fallback`; service text is kept
    #[must_use]
    pub fn or_fallback(self, fallback: &str) -> Self {
        if self.verbatim {
            self
        } else {
            Self {
                message: fallback.to_string(),
                ..self
            }
        }
    }

    /// Attach the HTTP status
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Operations that contact the scheduling service and must not overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Timetable generation
    Generate,
    /// Applying a new constraint
    ApplyConstraint,
    /// Removing a constraint and replaying the rest
    RemoveConstraint,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => write!(f, "timetable generation"),
            Self::ApplyConstraint => write!(f, "constraint application"),
            Self::RemoveConstraint => write!(f, "constraint removal"),
        }
    }
}

/// Errors surfaced by the session engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Local precondition failure; the service was not contacted
    #[error("{0}")]
    Validation(String),

    /// The service succeeded but there is nothing to show
    #[error("{0}")]
    NoResults(String),

    /// The service call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Another service-bound operation is still in flight
    #[error("{0} is already in progress")]
    Busy(Operation),

    /// A later action made this response irrelevant; it was discarded
    #[error("result discarded: superseded by a newer action")]
    Superseded,
}

impl EngineError {
    /// Shorthand for a validation failure
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
