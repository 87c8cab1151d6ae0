//! Data models for `IntelliPlan`

pub mod course;
pub mod timetable;

pub use course::{Course, CourseCatalog, SlotDefinition, SystemStats, TimeBlock};
pub use timetable::{ResultSet, SlotAssignment, Timetable};
