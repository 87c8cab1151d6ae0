//! Catalog and stats command handlers

use intelliplan::core::models::Course;
use intelliplan::core::service::SchedulerService;
use intelliplan::core::Session;

/// Print backend counters. Returns `false` when the service gave none.
pub async fn stats<S: SchedulerService + ?Sized>(session: &Session<S>) -> bool {
    match session.system_stats().await {
        Some(stats) => {
            println!("\n=== System Stats ===\n");
            println!("Courses: {}", stats.total_courses);
            println!("Slots:   {}", stats.total_slots);
            true
        }
        None => {
            eprintln!("✗ System stats are unavailable");
            false
        }
    }
}

/// Print catalog courses matching `search`
pub async fn list<S: SchedulerService + ?Sized>(session: &Session<S>, search: Option<&str>) -> bool {
    let catalog = match session.load_catalog().await {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("✗ {e}");
            return false;
        }
    };

    let matches = catalog.search(search.unwrap_or_default());
    if matches.is_empty() {
        println!("No courses match '{}'", search.unwrap_or_default());
        return true;
    }
    for course in &matches {
        println!("{}", format_course(course));
    }
    println!("\n{} of {} courses", matches.len(), catalog.len());
    true
}

/// One-line course summary followed by its slots
pub fn format_course(course: &Course) -> String {
    let mut out = format!(
        "{:<10} {} ({} credits)",
        course.course_code, course.course_name, course.credits
    );
    if !course.faculty_name.is_empty() {
        out.push_str(&format!(" - {}", course.faculty_name));
    }
    for slot in &course.slots {
        let blocks: Vec<String> = slot.time_blocks.iter().map(ToString::to_string).collect();
        out.push_str(&format!("\n    {:<6} {}", slot.slot_number, blocks.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use intelliplan::core::models::TimeBlock;

    #[test]
    fn test_format_course_lists_slots() {
        let mut course = Course::new("CS101", "Intro to Programming", 4).with_slot(
            "S1",
            vec![
                TimeBlock::new("Monday", "08:00", "09:00"),
                TimeBlock::new("Wednesday", "08:00", "09:00"),
            ],
        );
        course.faculty_name = "Dr. Rao".to_string();

        let text = format_course(&course);
        assert!(text.starts_with("CS101      Intro to Programming (4 credits) - Dr. Rao"));
        assert!(text.contains("S1     Monday 08:00-09:00, Wednesday 08:00-09:00"));
    }
}
