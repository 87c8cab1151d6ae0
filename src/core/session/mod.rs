//! Planning session: selection, generation, constraint chain and cursor
//!
//! [`Session`] wraps the pure [`SessionState`] reducer with the service calls.
//! Each service-bound operation reserves the single flight, releases the lock
//! while awaiting the service, then commits with the ticket it was issued.
//! Completions whose ticket went stale meanwhile are dropped with
//! [`EngineError::Superseded`].

pub mod state;

pub use state::{Action, SessionState, Ticket};

use crate::core::chain::{self, ConstraintChain};
use crate::core::error::{EngineError, Operation};
use crate::core::models::{CourseCatalog, SystemStats, Timetable};
use crate::core::service::{
    AppliedDescriptions, FilterResponse, SchedulerService, CATALOG_FALLBACK, FILTER_FALLBACK,
    GENERATE_FALLBACK,
};
use crate::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Message when generation succeeds with no combinations
pub const NO_COMBINATIONS: &str =
    "No valid timetable combinations found. Try selecting different courses.";
/// Message when an applied constraint leaves nothing to show
pub const NO_MATCHES: &str = "No timetables match the applied constraint";

/// Outcome of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Number of timetables in the new baseline
    pub timetables: usize,
}

/// Outcome of a successful constraint application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Chain entries added by this application
    pub added: Vec<String>,
    /// Timetables left after filtering
    pub remaining: usize,
}

impl ApplyReport {
    /// Whether the constraint filtered out every timetable
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Outcome of a successful constraint removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Description that was removed
    pub removed: String,
    /// Timetables shown after the replay
    pub remaining: usize,
}

/// Handle to one planning session.
///
/// Cloning yields another handle to the same session, so concurrent callers
/// observe one shared state and one single-flight slot.
pub struct Session<S: ?Sized> {
    service: Arc<S>,
    state: Arc<Mutex<SessionState>>,
    catalog: Arc<Mutex<Option<CourseCatalog>>>,
}

impl<S: ?Sized> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: SchedulerService + ?Sized> Session<S> {
    /// New empty session backed by `service`
    #[must_use]
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(SessionState::new())),
            catalog: Arc::new(Mutex::new(None)),
        }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        lock(&self.state).clone()
    }

    /// Reduce `action` into the shared state, committing only on success
    ///
    /// # Errors
    /// Whatever [`SessionState::reduce`] rejects; the state is left unchanged.
    pub fn dispatch(&self, action: Action) -> Result<SessionState, EngineError> {
        let mut guard = lock(&self.state);
        let next = guard.reduce(action)?;
        *guard = next.clone();
        drop(guard);
        Ok(next)
    }

    fn begin(&self, action: Action, operation: Operation) -> Result<(Ticket, SessionState), EngineError> {
        let started = self.dispatch(action)?;
        let ticket = Ticket {
            operation,
            version: started.version(),
        };
        debug!("Started {operation} at version {}", ticket.version);
        Ok((ticket, started))
    }

    /// Release the flight after a failed call. A stale ticket means a later
    /// action already released it.
    fn release(&self, ticket: Ticket) {
        if self.dispatch(Action::OperationFailed { ticket }).is_err() {
            debug!("Failure of {} arrived after it was superseded", ticket.operation);
        }
    }

    fn commit(&self, action: Action, operation: Operation) -> Result<SessionState, EngineError> {
        self.dispatch(action).inspect_err(|e| {
            if *e == EngineError::Superseded {
                warn!("Discarding stale {operation} response");
            }
        })
    }

    /// Course catalog, fetched from the service on first use
    ///
    /// # Errors
    /// Service failure, with the generic catalog message when the service
    /// gave no detail.
    pub async fn load_catalog(&self) -> Result<CourseCatalog, EngineError> {
        if let Some(catalog) = lock(&self.catalog).clone() {
            return Ok(catalog);
        }
        self.reload_catalog().await
    }

    /// Fetch the course catalog again, replacing the cached copy
    ///
    /// # Errors
    /// See [`load_catalog`](Self::load_catalog).
    pub async fn reload_catalog(&self) -> Result<CourseCatalog, EngineError> {
        let catalog = self
            .service
            .load_catalog()
            .await
            .map_err(|e| e.or_fallback(CATALOG_FALLBACK))?;
        info!("Loaded {} courses", catalog.len());
        *lock(&self.catalog) = Some(catalog.clone());
        Ok(catalog)
    }

    /// Cached catalog, if loaded
    #[must_use]
    pub fn catalog(&self) -> Option<CourseCatalog> {
        lock(&self.catalog).clone()
    }

    /// Backend counters. Failures are logged and reported as `None`.
    pub async fn system_stats(&self) -> Option<SystemStats> {
        match self.service.system_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Could not load system stats: {e}");
                None
            }
        }
    }

    /// Flip a course in or out of the selection
    pub fn toggle_course(&self, course_id: &str) -> SessionState {
        self.edit(Action::ToggleCourse(course_id.to_string()))
    }

    /// Flip a preferred slot; selects the course when adding a slot
    pub fn toggle_slot(&self, course_id: &str, slot_id: &str) -> SessionState {
        self.edit(Action::ToggleSlot {
            course_id: course_id.to_string(),
            slot_id: slot_id.to_string(),
        })
    }

    /// Select every course in `universe`
    pub fn select_all(&self, universe: Vec<String>) -> SessionState {
        self.edit(Action::SelectAll(universe))
    }

    /// Deselect every course; slot preferences are kept
    pub fn deselect_all(&self) -> SessionState {
        self.edit(Action::DeselectAll)
    }

    /// Select all of `universe`, or deselect all when it is fully selected
    pub fn toggle_all(&self, universe: Vec<String>) -> SessionState {
        self.edit(Action::ToggleAll(universe))
    }

    /// Selection edits and cursor moves cannot fail
    fn edit(&self, action: Action) -> SessionState {
        let mut guard = lock(&self.state);
        if let Ok(next) = guard.reduce(action) {
            *guard = next;
        }
        guard.clone()
    }

    /// Generate timetables for the current selection.
    ///
    /// On success the result becomes the new baseline, the chain is emptied
    /// and the cursor moves to the first timetable.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] when nothing is selected
    /// - [`EngineError::Busy`] when another operation is in flight
    /// - [`EngineError::Service`] on service failure
    /// - [`EngineError::NoResults`] when no combination exists; the previous
    ///   results stay in place
    /// - [`EngineError::Superseded`] when a later action invalidated the call
    pub async fn generate(&self) -> Result<GenerationReport, EngineError> {
        let (ticket, started) = self.begin(Action::StartGeneration, Operation::Generate)?;
        let selection = started.selection();
        info!(
            "Generating timetables for {} courses ({} with slot preferences)",
            selection.courses().len(),
            selection.slot_preferences().len()
        );

        let results = match self
            .service
            .generate(selection.courses(), selection.slot_preferences())
            .await
        {
            Ok(results) => results,
            Err(e) => {
                self.release(ticket);
                return Err(e.or_fallback(GENERATE_FALLBACK).into());
            }
        };

        let timetables = results.len();
        self.commit(
            Action::GenerationSucceeded { ticket, results },
            Operation::Generate,
        )?;
        if timetables == 0 {
            info!("Generation returned no combinations");
            return Err(EngineError::NoResults(NO_COMBINATIONS.to_string()));
        }
        info!("Generated {timetables} timetables");
        Ok(GenerationReport { timetables })
    }

    /// Filter the displayed timetables by `text` and append the service's
    /// descriptions to the chain.
    ///
    /// An empty filtered set is still committed; check
    /// [`ApplyReport::is_exhausted`]. When the displayed set is already empty
    /// the text is appended as is, without calling the service.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] for blank text or no baseline
    /// - [`EngineError::Busy`] when another operation is in flight
    /// - [`EngineError::Service`] on service failure
    /// - [`EngineError::Superseded`] when cleared before the response arrived
    pub async fn apply_constraint(&self, text: &str) -> Result<ApplyReport, EngineError> {
        let (ticket, started) = self.begin(
            Action::StartApply {
                text: text.to_string(),
            },
            Operation::ApplyConstraint,
        )?;
        let current = started.displayed().clone();
        info!("Applying constraint '{}' to {} timetables", text.trim(), current.len());

        let response = if current.is_empty() {
            debug!("Nothing to filter; appending without a service call");
            FilterResponse {
                results: current,
                applied: AppliedDescriptions::Missing,
            }
        } else {
            match self.service.filter(&current, text.trim()).await {
                Ok(response) => response,
                Err(e) => {
                    self.release(ticket);
                    return Err(e.or_fallback(FILTER_FALLBACK).into());
                }
            }
        };

        let added = response.applied.into_chain_entries(text);
        let remaining = response.results.len();
        self.commit(
            Action::ConstraintApplied {
                ticket,
                descriptions: added.clone(),
                results: response.results,
            },
            Operation::ApplyConstraint,
        )?;
        info!("Constraint applied: {remaining} timetables remain");
        Ok(ApplyReport { added, remaining })
    }

    /// Remove chain entry `index` and replay the remaining chain from the
    /// baseline.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] when `index` is out of range
    /// - [`EngineError::Busy`] when another operation is in flight
    /// - [`EngineError::Service`] when any replay step fails; the chain and
    ///   displayed set keep their pre-removal values
    /// - [`EngineError::Superseded`] when cleared before the replay finished
    pub async fn remove_constraint(&self, index: usize) -> Result<RemovalReport, EngineError> {
        let (ticket, started) =
            self.begin(Action::StartRemoval { index }, Operation::RemoveConstraint)?;

        let (Some(baseline), Some(remaining_chain), Some(removed)) = (
            started.baseline().cloned(),
            started.chain().without(index),
            started.chain().entries().get(index).cloned(),
        ) else {
            self.release(ticket);
            return Err(EngineError::validation("Nothing to remove"));
        };
        info!(
            "Removing constraint '{removed}'; replaying {} remaining",
            remaining_chain.len()
        );

        let results = match chain::replay(&*self.service, &baseline, &remaining_chain).await {
            Ok(results) => results,
            Err(e) => {
                self.release(ticket);
                return Err(e.into());
            }
        };

        let remaining = results.len();
        self.commit(
            Action::ReplayCompleted {
                ticket,
                chain: remaining_chain,
                results,
            },
            Operation::RemoveConstraint,
        )?;
        Ok(RemovalReport { removed, remaining })
    }

    /// Drop every constraint and show the baseline again. A pending apply or
    /// removal is superseded.
    ///
    /// # Errors
    /// [`EngineError::Busy`] while generation is in flight.
    pub fn clear_all(&self) -> Result<SessionState, EngineError> {
        let cleared = self.dispatch(Action::ClearAll)?;
        info!("Cleared all constraints");
        Ok(cleared)
    }

    /// Move to the next timetable; returns the new position
    pub fn next(&self) -> Option<usize> {
        self.edit(Action::NextResult).cursor().index()
    }

    /// Move to the previous timetable; returns the new position
    pub fn previous(&self) -> Option<usize> {
        self.edit(Action::PreviousResult).cursor().index()
    }

    /// Timetable under the cursor
    #[must_use]
    pub fn active_timetable(&self) -> Option<Timetable> {
        lock(&self.state).active_timetable().cloned()
    }

    /// Applied constraints
    #[must_use]
    pub fn chain(&self) -> ConstraintChain {
        lock(&self.state).chain().clone()
    }
}

