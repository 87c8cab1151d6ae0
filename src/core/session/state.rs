//! Session state and its pure transition function
//!
//! [`SessionState::reduce`] maps `(state, action)` to a new state or an error,
//! never touching the old value. Service calls live outside, in
//! [`Session`](super::Session), which brackets each call with a `Start*`
//! action and a completion action carrying the [`Ticket`] it was issued.

use crate::core::chain::ConstraintChain;
use crate::core::cursor::ResultCursor;
use crate::core::error::{EngineError, Operation};
use crate::core::models::{ResultSet, Timetable};
use crate::core::selection::SelectionState;

/// Message for generation with nothing selected
pub const EMPTY_SELECTION: &str = "Please select at least one course";
/// Message for a blank constraint
pub const BLANK_CONSTRAINT: &str = "Please enter a constraint";
/// Message for filtering before any generation
pub const NO_BASELINE: &str = "Generate timetables first, then apply filters";

/// Proof that a service-bound operation was started at a given version.
///
/// A completion carrying a ticket whose version no longer matches is stale
/// and gets discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Operation the ticket was issued for
    pub operation: Operation,
    /// State version when the operation started
    pub version: u64,
}

/// Everything that can change a session
#[derive(Debug, Clone)]
pub enum Action {
    /// Flip a course in or out of the selection
    ToggleCourse(String),
    /// Flip a preferred slot for a course
    ToggleSlot {
        /// Course identifier
        course_id: String,
        /// Slot identifier
        slot_id: String,
    },
    /// Select every course of the given universe
    SelectAll(Vec<String>),
    /// Deselect every course
    DeselectAll,
    /// Select all, or deselect all when everything is already selected
    ToggleAll(Vec<String>),
    /// Reserve the single flight for generation
    StartGeneration,
    /// Reserve the single flight for applying `text`
    StartApply {
        /// Constraint text as typed
        text: String,
    },
    /// Reserve the single flight for removing chain entry `index`
    StartRemoval {
        /// Zero-based chain position
        index: usize,
    },
    /// Generation came back; an empty set changes nothing but the flight
    GenerationSucceeded {
        /// Ticket from `StartGeneration`
        ticket: Ticket,
        /// Timetables returned
        results: ResultSet,
    },
    /// A filter call came back
    ConstraintApplied {
        /// Ticket from `StartApply`
        ticket: Ticket,
        /// Normalized descriptions to append
        descriptions: Vec<String>,
        /// Filtered set
        results: ResultSet,
    },
    /// A replay after removal finished
    ReplayCompleted {
        /// Ticket from `StartRemoval`
        ticket: Ticket,
        /// Chain without the removed entry
        chain: ConstraintChain,
        /// Replayed set
        results: ResultSet,
    },
    /// The service call for `ticket` failed; release the flight
    OperationFailed {
        /// Ticket of the failed operation
        ticket: Ticket,
    },
    /// Drop every constraint and show the baseline again
    ClearAll,
    /// Move to the next timetable
    NextResult,
    /// Move to the previous timetable
    PreviousResult,
}

/// Complete state of one planning session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    selection: SelectionState,
    baseline: Option<ResultSet>,
    displayed: ResultSet,
    chain: ConstraintChain,
    cursor: ResultCursor,
    version: u64,
    in_flight: Option<Operation>,
}

impl SessionState {
    /// Fresh session: nothing selected, nothing generated
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Course and slot choices
    #[must_use]
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Result set captured by the last successful generation
    #[must_use]
    pub const fn baseline(&self) -> Option<&ResultSet> {
        self.baseline.as_ref()
    }

    /// Result set currently shown
    #[must_use]
    pub const fn displayed(&self) -> &ResultSet {
        &self.displayed
    }

    /// Applied constraints
    #[must_use]
    pub const fn chain(&self) -> &ConstraintChain {
        &self.chain
    }

    /// Active position in the displayed set
    #[must_use]
    pub const fn cursor(&self) -> ResultCursor {
        self.cursor
    }

    /// Timetable under the cursor
    #[must_use]
    pub fn active_timetable(&self) -> Option<&Timetable> {
        self.cursor.index().and_then(|i| self.displayed.get(i))
    }

    /// Monotonic counter bumped on every committed result change
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Service-bound operation currently in flight
    #[must_use]
    pub const fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// Ticket for the operation in flight
    #[must_use]
    pub fn ticket(&self) -> Option<Ticket> {
        self.in_flight.map(|operation| Ticket {
            operation,
            version: self.version,
        })
    }

    /// Apply one action.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] for local precondition failures
    /// - [`EngineError::Busy`] when a service-bound operation is in flight
    /// - [`EngineError::Superseded`] for a completion with a stale ticket
    pub fn reduce(&self, action: Action) -> Result<Self, EngineError> {
        let mut next = self.clone();
        match action {
            Action::ToggleCourse(course_id) => next.selection.toggle_course(&course_id),
            Action::ToggleSlot { course_id, slot_id } => {
                next.selection.toggle_slot(&course_id, &slot_id);
            }
            Action::SelectAll(universe) => next.selection.select_all(universe),
            Action::DeselectAll => next.selection.deselect_all(),
            Action::ToggleAll(universe) => next.selection.toggle_all(&universe),

            Action::StartGeneration => {
                if self.selection.is_empty() {
                    return Err(EngineError::validation(EMPTY_SELECTION));
                }
                next.reserve(Operation::Generate)?;
            }
            Action::StartApply { text } => {
                if text.trim().is_empty() {
                    return Err(EngineError::validation(BLANK_CONSTRAINT));
                }
                if self.baseline.is_none() {
                    return Err(EngineError::validation(NO_BASELINE));
                }
                next.reserve(Operation::ApplyConstraint)?;
            }
            Action::StartRemoval { index } => {
                if index >= self.chain.len() {
                    return Err(EngineError::validation(format!(
                        "No applied filter at position {} ({} applied)",
                        index + 1,
                        self.chain.len()
                    )));
                }
                next.reserve(Operation::RemoveConstraint)?;
            }

            Action::GenerationSucceeded { ticket, results } => {
                next.settle(ticket)?;
                if !results.is_empty() {
                    next.cursor = ResultCursor::at_start(results.len());
                    next.displayed = results.clone();
                    next.baseline = Some(results);
                    next.chain = ConstraintChain::new();
                    next.version += 1;
                }
            }
            Action::ConstraintApplied {
                ticket,
                descriptions,
                results,
            } => {
                next.settle(ticket)?;
                next.chain = self.chain.appended(descriptions);
                next.show(results);
            }
            Action::ReplayCompleted {
                ticket,
                chain,
                results,
            } => {
                next.settle(ticket)?;
                next.chain = chain;
                next.show(results);
            }
            Action::OperationFailed { ticket } => next.settle(ticket)?,

            Action::ClearAll => {
                if self.in_flight == Some(Operation::Generate) {
                    return Err(EngineError::Busy(Operation::Generate));
                }
                let baseline = self.baseline.clone().unwrap_or_default();
                next.cursor = ResultCursor::at_start(baseline.len());
                next.displayed = baseline;
                next.chain = ConstraintChain::new();
                next.in_flight = None;
                next.version += 1;
            }
            Action::NextResult => next.cursor = self.cursor.next(),
            Action::PreviousResult => next.cursor = self.cursor.previous(),
        }
        Ok(next)
    }

    fn reserve(&mut self, operation: Operation) -> Result<(), EngineError> {
        if let Some(current) = self.in_flight {
            return Err(EngineError::Busy(current));
        }
        self.in_flight = Some(operation);
        Ok(())
    }

    /// Release the flight for `ticket`, rejecting stale completions
    fn settle(&mut self, ticket: Ticket) -> Result<(), EngineError> {
        if self.ticket() != Some(ticket) {
            return Err(EngineError::Superseded);
        }
        self.in_flight = None;
        Ok(())
    }

    fn show(&mut self, results: ResultSet) {
        self.cursor = self.cursor.reclamp(results.len());
        self.displayed = results;
        self.version += 1;
    }
}
