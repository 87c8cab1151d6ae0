//! Constraint chain and filter replay
//!
//! The displayed result set is always the baseline folded through the filter
//! service once per chain entry, in order. [`replay`] performs that fold and
//! stops contacting the service as soon as an intermediate set is empty.

use crate::core::error::ServiceError;
use crate::core::models::ResultSet;
use crate::core::service::{SchedulerService, REPLAY_FALLBACK};
use crate::debug;
use serde::Serialize;

/// Applied constraint descriptions in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintChain {
    entries: Vec<String>,
}

impl ConstraintChain {
    /// Empty chain
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries in application order
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no constraint is applied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chain with `descriptions` appended in order
    #[must_use]
    pub fn appended<I>(&self, descriptions: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = self.entries.clone();
        entries.extend(descriptions);
        Self { entries }
    }

    /// Chain without the entry at `index`, or `None` when out of range
    #[must_use]
    pub fn without(&self, index: usize) -> Option<Self> {
        (index < self.entries.len()).then(|| {
            let mut entries = self.entries.clone();
            entries.remove(index);
            Self { entries }
        })
    }
}

impl<S: Into<String>> FromIterator<S> for ConstraintChain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Fold the filter service over `chain`, starting from `baseline`.
///
/// Each step's output feeds the next. Once a step yields an empty set the
/// remaining entries are not sent. An empty chain returns the baseline itself.
///
/// # Errors
/// Returns the first service failure. Failures without a service detail carry
/// the replay fallback message.
pub async fn replay<S>(
    service: &S,
    baseline: &ResultSet,
    chain: &ConstraintChain,
) -> Result<ResultSet, ServiceError>
where
    S: SchedulerService + ?Sized,
{
    let mut current = baseline.clone();
    for (step, constraint) in chain.entries().iter().enumerate() {
        if current.is_empty() {
            debug!(
                "Replay stopped after {step} of {} constraints: no timetables left",
                chain.len()
            );
            break;
        }
        debug!("Replay step {}: '{constraint}' over {} timetables", step + 1, current.len());
        current = service
            .filter(&current, constraint)
            .await
            .map_err(|e| e.or_fallback(REPLAY_FALLBACK))?
            .results;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CourseCatalog, SystemStats, Timetable};
    use crate::core::selection::SlotPreferences;
    use crate::core::service::{AppliedDescriptions, FilterResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Keeps timetables whose credits are divisible by the constraint's number
    struct DivisorFilter {
        calls: Mutex<Vec<String>>,
    }

    impl DivisorFilter {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SchedulerService for DivisorFilter {
        async fn load_catalog(&self) -> Result<CourseCatalog, ServiceError> {
            Ok(CourseCatalog::default())
        }

        async fn generate(
            &self,
            _course_ids: &[String],
            _slot_preferences: &SlotPreferences,
        ) -> Result<ResultSet, ServiceError> {
            Ok(ResultSet::empty())
        }

        async fn filter(
            &self,
            current: &ResultSet,
            constraint_text: &str,
        ) -> Result<FilterResponse, ServiceError> {
            self.calls.lock().unwrap().push(constraint_text.to_string());
            if constraint_text == "fail" {
                return Err(ServiceError::new(crate::core::service::FILTER_FALLBACK));
            }
            let divisor: u32 = constraint_text.parse().unwrap();
            let kept = current
                .iter()
                .filter(|t| t.total_credits % divisor == 0)
                .cloned()
                .collect::<Vec<_>>();
            Ok(FilterResponse {
                results: ResultSet::new(kept),
                applied: AppliedDescriptions::One(constraint_text.to_string()),
            })
        }

        async fn system_stats(&self) -> Result<SystemStats, ServiceError> {
            Ok(SystemStats::default())
        }
    }

    fn baseline(credits: &[u32]) -> ResultSet {
        ResultSet::new(
            credits
                .iter()
                .map(|&total_credits| Timetable {
                    slots: vec![],
                    course_codes: vec![],
                    total_credits,
                })
                .collect(),
        )
    }

    #[test]
    fn test_without_removes_any_position() {
        let chain: ConstraintChain = ["a", "b", "c"].into_iter().collect();
        assert_eq!(chain.without(1).unwrap().entries(), ["a", "c"]);
        assert_eq!(chain.without(0).unwrap().entries(), ["b", "c"]);
        assert!(chain.without(3).is_none());
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_appended_keeps_order() {
        let chain = ConstraintChain::new().appended(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(chain.appended(vec!["z".to_string()]).entries(), ["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_empty_chain_returns_baseline_reference() {
        let service = DivisorFilter::new();
        let base = baseline(&[2, 3, 4]);

        let result = replay(&service, &base, &ConstraintChain::new()).await.unwrap();
        assert!(result.same_as(&base));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_replay_folds_in_order() {
        let service = DivisorFilter::new();
        let base = baseline(&[2, 3, 4, 6, 12]);
        let chain: ConstraintChain = ["2", "3"].into_iter().collect();

        let result = replay(&service, &base, &chain).await.unwrap();
        let credits: Vec<u32> = result.iter().map(|t| t.total_credits).collect();
        assert_eq!(credits, vec![6, 12]);
        assert_eq!(service.calls(), vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_replay_short_circuits_on_empty() {
        let service = DivisorFilter::new();
        let base = baseline(&[2, 4]);
        let chain: ConstraintChain = ["3", "2", "4"].into_iter().collect();

        let result = replay(&service, &base, &chain).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(service.calls(), vec!["3"]);
    }

    #[tokio::test]
    async fn test_replay_failure_uses_replay_message() {
        let service = DivisorFilter::new();
        let base = baseline(&[2, 4]);
        let chain: ConstraintChain = ["2", "fail", "4"].into_iter().collect();

        let err = replay(&service, &base, &chain).await.unwrap_err();
        assert_eq!(err.message, REPLAY_FALLBACK);
        assert_eq!(service.calls(), vec!["2", "fail"]);
    }
}
