//! Timetable and result set models
//!
//! A [`Timetable`] is one conflict-free assignment of slots to the selected
//! courses, produced by the scheduling service. The engine never edits one;
//! it only narrows the [`ResultSet`] that holds them.

use super::course::TimeBlock;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// One course placed into one of its slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// Course identifier
    pub course_code: String,
    /// Course name
    #[serde(default)]
    pub course_name: String,
    /// Faculty teaching this slot
    #[serde(default)]
    pub faculty_name: String,
    /// Slot identifier
    pub slot_number: String,
    /// Credit count
    #[serde(default)]
    pub credits: u32,
    /// Weekly meetings
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
}

/// A complete timetable as returned by generation or filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    /// Slot assignments in service order
    pub slots: Vec<SlotAssignment>,
    /// Courses covered, in service order
    #[serde(default)]
    pub course_codes: Vec<String>,
    /// Sum of credits
    #[serde(default)]
    pub total_credits: u32,
}

impl Timetable {
    /// Assignments grouped by day, preserving service order within each day
    #[must_use]
    pub fn meetings_by_day(&self) -> Vec<(String, Vec<(&SlotAssignment, &TimeBlock)>)> {
        let mut days: Vec<(String, Vec<(&SlotAssignment, &TimeBlock)>)> = Vec::new();
        for slot in &self.slots {
            for block in &slot.time_blocks {
                match days.iter_mut().find(|(day, _)| *day == block.day) {
                    Some((_, entries)) => entries.push((slot, block)),
                    None => days.push((block.day.clone(), vec![(slot, block)])),
                }
            }
        }
        days
    }
}

/// Immutable, cheaply cloned sequence of timetables.
///
/// Cloning shares the underlying allocation, so the baseline captured after
/// generation is held by reference rather than copied per filter step.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    items: Arc<[Timetable]>,
}

impl ResultSet {
    /// Take ownership of a list of timetables
    #[must_use]
    pub fn new(items: Vec<Timetable>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Empty result set
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether both values share the same allocation
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Borrow the timetables
    #[must_use]
    pub fn as_slice(&self) -> &[Timetable] {
        &self.items
    }
}

impl Deref for ResultSet {
    type Target = [Timetable];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.items[..] == other.items[..]
    }
}

impl From<Vec<Timetable>> for ResultSet {
    fn from(items: Vec<Timetable>) -> Self {
        Self::new(items)
    }
}

impl Serialize for ResultSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Timetable>::deserialize(deserializer).map(Self::new)
    }
}
