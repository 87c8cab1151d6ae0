//! Course catalog model

use serde::{Deserialize, Serialize};
use std::fmt;

/// One weekly meeting of a slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Day name (e.g., "Monday")
    pub day: String,
    /// Start time as sent by the service (e.g., "08:00")
    pub start_time: String,
    /// End time as sent by the service (e.g., "09:00")
    pub end_time: String,
}

impl TimeBlock {
    /// Create a new time block
    #[must_use]
    pub fn new(day: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            day: day.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start_time, self.end_time)
    }
}

/// A selectable section of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Slot identifier, unique within its course (e.g., "S1")
    pub slot_number: String,
    /// Meetings in the order the service lists them
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
}

/// Represents a course offered by the scheduling service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course code, used as the course identifier (e.g., "CS101")
    pub course_code: String,

    /// Course name (e.g., "Introduction to Programming")
    #[serde(default)]
    pub course_name: String,

    /// Faculty listed for the course's first slot
    #[serde(default)]
    pub faculty_name: String,

    /// Credit count
    #[serde(default)]
    pub credits: u32,

    /// Available slots
    #[serde(default)]
    pub slots: Vec<SlotDefinition>,
}

impl Course {
    /// Create a course without slots
    #[must_use]
    pub fn new(course_code: &str, course_name: &str, credits: u32) -> Self {
        Self {
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
            faculty_name: String::new(),
            credits,
            slots: Vec::new(),
        }
    }

    /// Add a slot definition
    #[must_use]
    pub fn with_slot(mut self, slot_number: &str, time_blocks: Vec<TimeBlock>) -> Self {
        self.slots.push(SlotDefinition {
            slot_number: slot_number.to_string(),
            time_blocks,
        });
        self
    }

    /// Look up a slot by its identifier
    #[must_use]
    pub fn slot(&self, slot_number: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|s| s.slot_number == slot_number)
    }

    /// Case-insensitive substring match on code or name
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.course_code.to_lowercase().contains(&needle)
            || self.course_name.to_lowercase().contains(&needle)
    }
}

/// Every course the service can schedule, in service order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseCatalog {
    /// Courses in the order the service returned them
    pub courses: Vec<Course>,
}

impl CourseCatalog {
    /// Wrap a course list
    #[must_use]
    pub const fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Course identifiers, used as the universe for select-all
    #[must_use]
    pub fn course_ids(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.course_code.clone()).collect()
    }

    /// Find a course by code
    #[must_use]
    pub fn get(&self, course_code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_code == course_code)
    }

    /// Courses whose code or name contains `term` (case-insensitive).
    /// A blank term returns every course.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Course> {
        self.courses.iter().filter(|c| c.matches(term)).collect()
    }

    /// Total number of slots across all courses
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.courses.iter().map(|c| c.slots.len()).sum()
    }

    /// Number of courses
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Informational counters reported by the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStats {
    /// Unique courses known to the service
    pub total_courses: usize,
    /// Slots across all courses
    pub total_slots: usize,
}
