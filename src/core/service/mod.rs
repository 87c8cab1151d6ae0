//! Scheduling service boundary
//!
//! The engine reaches the scheduling backend only through [`SchedulerService`].
//! [`HttpSchedulerService`] talks to the HTTP+JSON backend; tests plug in
//! in-memory implementations.

pub mod http;

pub use http::HttpSchedulerService;

use crate::core::error::ServiceError;
use crate::core::models::{CourseCatalog, ResultSet, SystemStats};
use crate::core::selection::SlotPreferences;
use async_trait::async_trait;
use serde::Deserialize;

/// Generic message when catalog loading fails without a detail
pub const CATALOG_FALLBACK: &str = "Error loading courses";
/// Generic message when generation fails without a detail
pub const GENERATE_FALLBACK: &str = "Error generating timetables";
/// Generic message when a constraint apply fails without a detail
pub const FILTER_FALLBACK: &str = "Error applying constraint";
/// Generic message when a chain replay fails without a detail
pub const REPLAY_FALLBACK: &str = "Error reapplying filters";
/// Generic message when the stats call fails without a detail
pub const STATS_FALLBACK: &str = "Error loading system stats";

/// Operations the engine needs from the scheduling backend
#[async_trait]
pub trait SchedulerService: Send + Sync {
    /// Fetch every course with its slots. Safe to call repeatedly.
    async fn load_catalog(&self) -> Result<CourseCatalog, ServiceError>;

    /// Build every conflict-free timetable for `course_ids`, restricting each
    /// course to its preferred slots when it has any. An empty result is valid.
    async fn generate(
        &self,
        course_ids: &[String],
        slot_preferences: &SlotPreferences,
    ) -> Result<ResultSet, ServiceError>;

    /// Narrow `current` by a natural-language constraint.
    /// Pure function of its inputs; no server-side session is assumed.
    async fn filter(
        &self,
        current: &ResultSet,
        constraint_text: &str,
    ) -> Result<FilterResponse, ServiceError>;

    /// Informational counters
    async fn system_stats(&self) -> Result<SystemStats, ServiceError>;
}

/// Result of one filter call
#[derive(Debug, Clone)]
pub struct FilterResponse {
    /// Timetables that satisfy the constraint
    pub results: ResultSet,
    /// What the service says it applied, in whatever shape it sent
    pub applied: AppliedDescriptions,
}

/// One entry of the service's applied-constraint list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DescriptionEntry {
    /// Plain description text
    Text(String),
    /// Structured intent record (intent, entities, confidence)
    Structured(serde_json::Value),
}

/// The applied-constraint field as sent by the service: absent, one string,
/// or a list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AppliedDescriptions {
    /// Field missing or null
    #[default]
    Missing,
    /// A single description
    One(String),
    /// Zero or more entries
    Many(Vec<DescriptionEntry>),
}

impl AppliedDescriptions {
    /// Normalize into chain entries.
    ///
    /// Every entry becomes one chain entry in the order sent. Text entries are
    /// kept as sent; structured entries name the user's own `input`.
    /// When nothing usable remains the input itself becomes the single entry,
    /// so every successful apply adds at least one chain entry.
    #[must_use]
    pub fn into_chain_entries(self, input: &str) -> Vec<String> {
        let input = input.trim();
        let mut entries: Vec<String> = Vec::new();
        let mut push = |text: &str| {
            let text = text.trim();
            if !text.is_empty() {
                entries.push(text.to_string());
            }
        };

        match self {
            Self::Missing => {}
            Self::One(text) => push(&text),
            Self::Many(list) => {
                for entry in list {
                    match entry {
                        DescriptionEntry::Text(text) => push(&text),
                        DescriptionEntry::Structured(_) => push(input),
                    }
                }
            }
        }

        if entries.is_empty() {
            entries.push(input.to_string());
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AppliedDescriptions {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_string_becomes_one_entry() {
        let applied = parse(r#""No weekend classes""#);
        assert_eq!(
            applied.into_chain_entries("No classes on Saturday or Sunday"),
            vec!["No weekend classes"]
        );
    }

    #[test]
    fn test_string_list_kept_in_order() {
        let applied = parse(r#"["No weekend classes", "Start after 1 PM"]"#);
        assert_eq!(
            applied.into_chain_entries("weekends off, afternoons only"),
            vec!["No weekend classes", "Start after 1 PM"]
        );
    }

    #[test]
    fn test_structured_entries_each_map_to_input() {
        let applied = parse(
            r#"[
                {"intent": "avoid_day", "entities": {"days": ["Saturday"]}, "confidence": 0.9},
                {"intent": "avoid_day", "entities": {"days": ["Sunday"]}, "confidence": 0.9}
            ]"#,
        );
        assert_eq!(
            applied.into_chain_entries(" No classes on Saturday or Sunday "),
            vec![
                "No classes on Saturday or Sunday",
                "No classes on Saturday or Sunday"
            ]
        );
    }

    #[test]
    fn test_repeated_text_entries_are_all_kept() {
        let applied = parse(r#"["No weekend classes", "No weekend classes"]"#);
        assert_eq!(
            applied.into_chain_entries("x"),
            vec!["No weekend classes", "No weekend classes"]
        );
    }

    #[test]
    fn test_empty_or_missing_falls_back_to_input() {
        assert_eq!(parse("[]").into_chain_entries("Morning only"), vec!["Morning only"]);
        assert_eq!(parse("null").into_chain_entries("Morning only"), vec!["Morning only"]);
        assert_eq!(
            AppliedDescriptions::Missing.into_chain_entries("Morning only"),
            vec!["Morning only"]
        );
    }

    #[test]
    fn test_mixed_entries() {
        let applied = parse(r#"["No weekend classes", {"intent": "min_time"}]"#);
        assert_eq!(
            applied.into_chain_entries("no weekends, nothing before 1pm"),
            vec!["No weekend classes", "no weekends, nothing before 1pm"]
        );
    }
}
