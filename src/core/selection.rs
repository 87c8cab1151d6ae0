//! Course and slot selection state
//!
//! Holds which courses the user picked and, per course, which slots they
//! prefer. A course with no preference accepts any slot.

use serde::Serialize;
use std::collections::BTreeMap;

/// Course identifier → preferred slot identifiers, in click order
pub type SlotPreferences = BTreeMap<String, Vec<String>>;

/// The user's course and slot choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    courses: Vec<String>,
    slot_preferences: SlotPreferences,
}

impl SelectionState {
    /// Empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected course identifiers in the order they were selected
    #[must_use]
    pub fn courses(&self) -> &[String] {
        &self.courses
    }

    /// Preferred slots per course
    #[must_use]
    pub const fn slot_preferences(&self) -> &SlotPreferences {
        &self.slot_preferences
    }

    /// Preferred slots for one course (empty when any slot is fine)
    #[must_use]
    pub fn preferred_slots(&self, course_id: &str) -> &[String] {
        self.slot_preferences
            .get(course_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether a course is selected
    #[must_use]
    pub fn is_selected(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c == course_id)
    }

    /// Whether no course is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Flip a course in or out of the selection.
    ///
    /// Deselecting keeps the course's slot preferences, so selecting it again
    /// brings them back.
    pub fn toggle_course(&mut self, course_id: &str) {
        if let Some(pos) = self.courses.iter().position(|c| c == course_id) {
            self.courses.remove(pos);
        } else {
            self.courses.push(course_id.to_string());
        }
    }

    /// Flip a slot in or out of a course's preferences.
    ///
    /// A non-empty preference set selects the course. Emptying the set never
    /// deselects it.
    pub fn toggle_slot(&mut self, course_id: &str, slot_id: &str) {
        let slots = self
            .slot_preferences
            .entry(course_id.to_string())
            .or_default();
        if let Some(pos) = slots.iter().position(|s| s == slot_id) {
            slots.remove(pos);
        } else {
            slots.push(slot_id.to_string());
        }

        if slots.is_empty() {
            self.slot_preferences.remove(course_id);
        } else if !self.is_selected(course_id) {
            self.courses.push(course_id.to_string());
        }
    }

    /// Select every course in `universe`, in its order
    pub fn select_all<I, S>(&mut self, universe: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.courses.clear();
        for id in universe {
            let id = id.into();
            if !self.courses.contains(&id) {
                self.courses.push(id);
            }
        }
    }

    /// Deselect every course. Slot preferences are kept.
    pub fn deselect_all(&mut self) {
        self.courses.clear();
    }

    /// Deselect everything when the whole universe is already selected,
    /// otherwise select the whole universe
    pub fn toggle_all(&mut self, universe: &[String]) {
        if !universe.is_empty() && universe.iter().all(|id| self.is_selected(id)) {
            self.deselect_all();
        } else {
            self.select_all(universe.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_course_flips_membership() {
        let mut selection = SelectionState::new();
        selection.toggle_course("CS101");
        selection.toggle_course("MA201");
        assert_eq!(selection.courses(), ["CS101", "MA201"]);

        selection.toggle_course("CS101");
        assert_eq!(selection.courses(), ["MA201"]);
    }

    #[test]
    fn test_slot_toggle_auto_selects_course() {
        let mut selection = SelectionState::new();
        selection.toggle_slot("CS101", "S2");

        assert!(selection.is_selected("CS101"));
        assert_eq!(selection.preferred_slots("CS101"), ["S2"]);
    }

    #[test]
    fn test_slot_toggle_keeps_click_order() {
        let mut selection = SelectionState::new();
        selection.toggle_slot("CS101", "S3");
        selection.toggle_slot("CS101", "S1");
        selection.toggle_slot("CS101", "S2");
        selection.toggle_slot("CS101", "S1");

        assert_eq!(selection.preferred_slots("CS101"), ["S3", "S2"]);
        assert_eq!(selection.courses(), ["CS101"]);
    }

    #[test]
    fn test_emptying_preferences_does_not_deselect() {
        let mut selection = SelectionState::new();
        selection.toggle_slot("CS101", "S1");
        selection.toggle_slot("CS101", "S1");

        assert!(selection.is_selected("CS101"));
        assert!(selection.preferred_slots("CS101").is_empty());
        assert!(!selection.slot_preferences().contains_key("CS101"));
    }

    #[test]
    fn test_deselect_keeps_preferences() {
        let mut selection = SelectionState::new();
        selection.toggle_slot("CS101", "S1");
        selection.toggle_course("CS101");

        assert!(!selection.is_selected("CS101"));
        assert_eq!(selection.preferred_slots("CS101"), ["S1"]);

        selection.toggle_course("CS101");
        assert_eq!(selection.preferred_slots("CS101"), ["S1"]);
    }

    #[test]
    fn test_select_all_and_deselect_all() {
        let mut selection = SelectionState::new();
        selection.toggle_course("PH110");
        selection.select_all(["CS101", "MA201", "CS101"]);
        assert_eq!(selection.courses(), ["CS101", "MA201"]);

        selection.deselect_all();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_switches_between_full_and_empty() {
        let universe = vec!["CS101".to_string(), "MA201".to_string()];
        let mut selection = SelectionState::new();
        selection.toggle_course("MA201");

        selection.toggle_all(&universe);
        assert_eq!(selection.courses(), ["CS101", "MA201"]);

        selection.toggle_all(&universe);
        assert!(selection.is_empty());
    }
}
