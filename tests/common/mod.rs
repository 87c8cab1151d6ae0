//! In-memory scheduling service shared by the session tests
#![allow(dead_code)]

use async_trait::async_trait;
use intelliplan::core::error::ServiceError;
use intelliplan::core::models::{Course, CourseCatalog, ResultSet, SystemStats, Timetable};
use intelliplan::core::selection::SlotPreferences;
use intelliplan::core::service::{AppliedDescriptions, FilterResponse, SchedulerService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Timetable identified by its credit total
pub fn timetable(id: u32) -> Timetable {
    Timetable {
        slots: vec![],
        course_codes: vec![format!("T{id}")],
        total_credits: id,
    }
}

/// Credit totals of a result set, for compact assertions
pub fn ids(set: &ResultSet) -> Vec<u32> {
    set.iter().map(|t| t.total_credits).collect()
}

struct Rule {
    keep: Vec<u32>,
    applied: AppliedDescriptions,
}

/// Scripted service that counts every call.
///
/// `filter` keeps the timetables listed by the rule for the constraint text;
/// unknown texts keep everything and report no descriptions.
pub struct MockScheduler {
    catalog: CourseCatalog,
    timetables: Mutex<Vec<u32>>,
    rules: Mutex<HashMap<String, Rule>>,
    failures: Mutex<HashMap<String, ServiceError>>,
    generate_error: Mutex<Option<ServiceError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    generate_calls: AtomicUsize,
    filter_calls: Mutex<Vec<String>>,
    stats_available: bool,
}

impl MockScheduler {
    pub fn new(timetables: &[u32]) -> Self {
        Self {
            catalog: CourseCatalog::new(vec![
                Course::new("CS101", "Introduction to Programming", 4),
                Course::new("MA201", "Linear Algebra", 3),
                Course::new("PH110", "Physics I", 4),
            ]),
            timetables: Mutex::new(timetables.to_vec()),
            rules: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            generate_error: Mutex::new(None),
            gate: Mutex::new(None),
            generate_calls: AtomicUsize::new(0),
            filter_calls: Mutex::new(Vec::new()),
            stats_available: true,
        }
    }

    pub fn without_stats(mut self) -> Self {
        self.stats_available = false;
        self
    }

    /// Filtering by `text` keeps `keep` and reports `applied`
    pub fn rule(self, text: &str, keep: &[u32], applied: AppliedDescriptions) -> Self {
        self.set_rule(text, keep, applied);
        self
    }

    pub fn set_rule(&self, text: &str, keep: &[u32], applied: AppliedDescriptions) {
        self.rules.lock().unwrap().insert(
            text.to_string(),
            Rule {
                keep: keep.to_vec(),
                applied,
            },
        );
    }

    pub fn set_timetables(&self, timetables: &[u32]) {
        *self.timetables.lock().unwrap() = timetables.to_vec();
    }

    pub fn fail_filter(&self, text: &str, error: ServiceError) {
        self.failures
            .lock()
            .unwrap()
            .insert(text.to_string(), error);
    }

    pub fn fail_generate(&self, error: Option<ServiceError>) {
        *self.generate_error.lock().unwrap() = error;
    }

    /// From now on every generate/filter call waits for one notification
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn filter_calls(&self) -> Vec<String> {
        self.filter_calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.generate_calls.store(0, Ordering::SeqCst);
        self.filter_calls.lock().unwrap().clear();
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl SchedulerService for MockScheduler {
    async fn load_catalog(&self) -> Result<CourseCatalog, ServiceError> {
        Ok(self.catalog.clone())
    }

    async fn generate(
        &self,
        _course_ids: &[String],
        _slot_preferences: &SlotPreferences,
    ) -> Result<ResultSet, ServiceError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        if let Some(error) = self.generate_error.lock().unwrap().clone() {
            return Err(error);
        }
        let ids = self.timetables.lock().unwrap().clone();
        Ok(ResultSet::new(ids.into_iter().map(timetable).collect()))
    }

    async fn filter(
        &self,
        current: &ResultSet,
        constraint_text: &str,
    ) -> Result<FilterResponse, ServiceError> {
        self.filter_calls
            .lock()
            .unwrap()
            .push(constraint_text.to_string());
        self.wait_for_gate().await;
        if let Some(error) = self.failures.lock().unwrap().get(constraint_text) {
            return Err(error.clone());
        }

        let rules = self.rules.lock().unwrap();
        let (keep, applied) = match rules.get(constraint_text) {
            Some(rule) => (Some(rule.keep.clone()), rule.applied.clone()),
            None => (None, AppliedDescriptions::Missing),
        };
        let results = current
            .iter()
            .filter(|t| keep.as_ref().map_or(true, |k| k.contains(&t.total_credits)))
            .cloned()
            .collect::<Vec<_>>();
        Ok(FilterResponse {
            results: ResultSet::new(results),
            applied,
        })
    }

    async fn system_stats(&self) -> Result<SystemStats, ServiceError> {
        if self.stats_available {
            Ok(SystemStats {
                total_courses: self.catalog.len(),
                total_slots: self.catalog.total_slots(),
            })
        } else {
            Err(ServiceError::new("Error loading system stats"))
        }
    }
}
