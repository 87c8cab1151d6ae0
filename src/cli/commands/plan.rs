//! Interactive planning session
//!
//! Reads one command per line from stdin and drives a [`Session`]. Commands
//! mirror the planner screen: pick courses and slots, generate, narrow with
//! constraints, then browse and export timetables.

use super::catalog::format_course;
use intelliplan::core::models::{CourseCatalog, Timetable};
use intelliplan::core::service::SchedulerService;
use intelliplan::core::session::{SessionState, NO_MATCHES};
use intelliplan::core::{EngineError, Session};
use intelliplan::{debug, verbose};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  courses [TERM]     list courses, optionally matching TERM
  select ID          select or deselect a course
  slot ID SLOT       prefer or unprefer a slot (selects the course)
  all | none         select every course / clear the selection
  selection          show selected courses and slot preferences
  generate           generate timetables for the selection
  filter TEXT        narrow timetables with a constraint
  quick NAME         apply a quick filter: weekends, morning, afternoon, back-to-back
  remove N           remove applied filter number N
  clear              remove every applied filter
  next | prev        browse timetables
  show               show the current timetable
  export [PATH]      write the current timetable as JSON
  status             show counts and applied filters
  help               show this help
  quit               leave the session";

/// Canned constraints offered next to the free-text box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickFilter {
    /// Keep weekends free
    NoWeekends,
    /// Finish before noon
    MorningOnly,
    /// Start after lunch
    AfternoonStart,
    /// No consecutive classes
    NoBackToBack,
}

impl QuickFilter {
    /// Constraint text sent to the filter service
    #[must_use]
    pub const fn constraint(self) -> &'static str {
        match self {
            Self::NoWeekends => "No classes on Saturday or Sunday",
            Self::MorningOnly => "All classes before 12 PM",
            Self::AfternoonStart => "No classes before 1 PM",
            Self::NoBackToBack => "Avoid consecutive classes",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "weekends" | "no-weekends" => Some(Self::NoWeekends),
            "morning" | "morning-only" => Some(Self::MorningOnly),
            "afternoon" | "afternoon-start" => Some(Self::AfternoonStart),
            "back-to-back" | "no-back-to-back" => Some(Self::NoBackToBack),
            _ => None,
        }
    }
}

/// One parsed REPL line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanCommand {
    Courses(Option<String>),
    Select(String),
    Slot(String, String),
    All,
    None,
    Selection,
    Generate,
    Filter(String),
    Quick(QuickFilter),
    /// Zero-based position
    Remove(usize),
    Clear,
    Next,
    Prev,
    Show,
    Export(Option<PathBuf>),
    Status,
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `Ok(None)`
pub fn parse_line(line: &str) -> Result<Option<PlanCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "courses" | "ls" => PlanCommand::Courses((!rest.is_empty()).then(|| rest.to_string())),
        "select" | "toggle" => {
            if rest.is_empty() {
                return Err("usage: select ID".to_string());
            }
            PlanCommand::Select(rest.to_string())
        }
        "slot" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
            [course, slot] => PlanCommand::Slot((*course).to_string(), (*slot).to_string()),
            _ => return Err("usage: slot ID SLOT".to_string()),
        },
        "all" => PlanCommand::All,
        "none" => PlanCommand::None,
        "selection" | "sel" => PlanCommand::Selection,
        "generate" | "gen" => PlanCommand::Generate,
        "filter" => {
            if rest.is_empty() {
                return Err("usage: filter TEXT".to_string());
            }
            PlanCommand::Filter(rest.to_string())
        }
        "quick" => QuickFilter::parse(rest)
            .map(PlanCommand::Quick)
            .ok_or_else(|| "usage: quick weekends|morning|afternoon|back-to-back".to_string())?,
        "remove" | "rm" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => PlanCommand::Remove(n - 1),
            _ => return Err("usage: remove N (N starts at 1)".to_string()),
        },
        "clear" => PlanCommand::Clear,
        "next" | "n" => PlanCommand::Next,
        "prev" | "p" => PlanCommand::Prev,
        "show" => PlanCommand::Show,
        "export" => PlanCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "status" => PlanCommand::Status,
        "help" | "?" => PlanCommand::Help,
        "quit" | "exit" | "q" => PlanCommand::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for the list.")),
    };
    Ok(Some(command))
}

/// Startup options for `intelliplan plan`
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Courses to preselect
    pub courses: Vec<String>,
    /// `(course, slot)` preferences to preselect
    pub slots: Vec<(String, String)>,
    /// Generate before the first prompt
    pub generate: bool,
    /// Default export directory
    pub export_dir: PathBuf,
}

/// Run the interactive session until `quit` or end of input
pub async fn run<S: SchedulerService + ?Sized>(session: &Session<S>, options: PlanOptions) -> bool {
    match session.load_catalog().await {
        Ok(catalog) => println!("✓ Loaded {} courses", catalog.len()),
        Err(e) => eprintln!("✗ {e}"),
    }

    for course in &options.courses {
        if !session.state().selection().is_selected(course) {
            session.toggle_course(course);
        }
    }
    for (course, slot) in &options.slots {
        if !session.state().selection().preferred_slots(course).contains(slot) {
            session.toggle_slot(course, slot);
        }
    }
    if options.generate {
        execute(session, PlanCommand::Generate, &options.export_dir).await;
    }

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("intelliplan> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("✗ Failed to read input: {e}");
                return false;
            }
        };
        match parse_line(&line) {
            Ok(Some(PlanCommand::Quit)) => break,
            Ok(Some(command)) => execute(session, command, &options.export_dir).await,
            Ok(None) => {}
            Err(message) => eprintln!("✗ {message}"),
        }
    }
    true
}

async fn execute<S: SchedulerService + ?Sized>(
    session: &Session<S>,
    command: PlanCommand,
    export_dir: &Path,
) {
    debug!("Plan command: {command:?}");
    match command {
        PlanCommand::Courses(term) => {
            match session.load_catalog().await {
                Ok(catalog) => {
                    let state = session.state();
                    for course in catalog.search(term.as_deref().unwrap_or_default()) {
                        let mark = if state.selection().is_selected(&course.course_code) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        println!("{mark} {}", format_course(course));
                    }
                }
                Err(e) => eprintln!("✗ {e}"),
            }
        }
        PlanCommand::Select(course) => {
            warn_unknown(session.catalog().as_ref(), &course);
            let state = session.toggle_course(&course);
            if state.selection().is_selected(&course) {
                println!("✓ Selected {course}");
            } else {
                println!("✓ Deselected {course}");
            }
        }
        PlanCommand::Slot(course, slot) => {
            warn_unknown(session.catalog().as_ref(), &course);
            let state = session.toggle_slot(&course, &slot);
            let preferred = state.selection().preferred_slots(&course);
            if preferred.contains(&slot) {
                println!("✓ Preferring slot {slot} for {course}");
            } else {
                println!("✓ Dropped slot {slot} for {course}");
            }
        }
        PlanCommand::All => match session.load_catalog().await {
            Ok(catalog) => {
                let state = session.select_all(catalog.course_ids());
                println!("✓ Selected {} courses", state.selection().courses().len());
            }
            Err(e) => eprintln!("✗ {e}"),
        },
        PlanCommand::None => {
            session.deselect_all();
            println!("✓ Selection cleared");
        }
        PlanCommand::Selection => print_selection(&session.state()),
        PlanCommand::Generate => match session.generate().await {
            Ok(report) => {
                println!("✓ Generated {} timetables", report.timetables);
                print_active(&session.state());
            }
            Err(e) => report_error(&e),
        },
        PlanCommand::Filter(text) => apply(session, &text).await,
        PlanCommand::Quick(quick) => apply(session, quick.constraint()).await,
        PlanCommand::Remove(index) => match session.remove_constraint(index).await {
            Ok(report) => {
                println!(
                    "✓ Removed '{}': {} timetables shown",
                    report.removed, report.remaining
                );
                print_chain(&session.state());
            }
            Err(e) => report_error(&e),
        },
        PlanCommand::Clear => match session.clear_all() {
            Ok(state) => println!(
                "✓ All filters cleared: {} timetables shown",
                state.displayed().len()
            ),
            Err(e) => report_error(&e),
        },
        PlanCommand::Next => {
            session.next();
            print_active(&session.state());
        }
        PlanCommand::Prev => {
            session.previous();
            print_active(&session.state());
        }
        PlanCommand::Show => print_active(&session.state()),
        PlanCommand::Export(path) => export(&session.state(), path, export_dir),
        PlanCommand::Status => print_status(&session.state()),
        PlanCommand::Help => println!("{HELP}"),
        PlanCommand::Quit => {}
    }
}

async fn apply<S: SchedulerService + ?Sized>(session: &Session<S>, text: &str) {
    match session.apply_constraint(text).await {
        Ok(report) => {
            println!("✓ Applied: {}", report.added.join("; "));
            if report.is_exhausted() {
                println!("{NO_MATCHES}");
            } else {
                println!("{} timetables match", report.remaining);
                print_active(&session.state());
            }
        }
        Err(e) => report_error(&e),
    }
}

/// Ids missing from a loaded catalog are kept; generation will reject them
fn unknown_course_warning(catalog: Option<&CourseCatalog>, course: &str) -> Option<String> {
    catalog
        .filter(|catalog| catalog.get(course).is_none())
        .map(|_| format!("⚠ '{course}' is not in the catalog; generation will reject it"))
}

fn warn_unknown(catalog: Option<&CourseCatalog>, course: &str) {
    if let Some(message) = unknown_course_warning(catalog, course) {
        debug!("Unknown course id {course}");
        eprintln!("{message}");
    }
}

fn report_error(error: &EngineError) {
    match error {
        EngineError::NoResults(message) => println!("{message}"),
        other => eprintln!("✗ {other}"),
    }
}

fn print_selection(state: &SessionState) {
    let selection = state.selection();
    if selection.is_empty() {
        println!("No courses selected");
        return;
    }
    for course in selection.courses() {
        let slots = selection.preferred_slots(course);
        if slots.is_empty() {
            println!("  {course} (any slot)");
        } else {
            println!("  {course} (slots {})", slots.join(", "));
        }
    }
}

fn print_chain(state: &SessionState) {
    for (i, entry) in state.chain().entries().iter().enumerate() {
        println!("  {}. {entry}", i + 1);
    }
}

fn print_status(state: &SessionState) {
    println!("Selected courses: {}", state.selection().courses().len());
    match state.baseline() {
        Some(baseline) => println!(
            "Timetables: {} shown of {} generated",
            state.displayed().len(),
            baseline.len()
        ),
        None => println!("Timetables: none generated yet"),
    }
    if state.chain().is_empty() {
        println!("Filters: none");
    } else {
        println!("Filters:");
        print_chain(state);
    }
}

fn print_active(state: &SessionState) {
    let cursor = state.cursor();
    match (cursor.index(), state.active_timetable()) {
        (Some(index), Some(timetable)) => {
            println!("{}", format_timetable(timetable, index, cursor.len()));
        }
        _ => println!("No timetables to show"),
    }
}

/// Render a timetable grouped by day
pub fn format_timetable(timetable: &Timetable, index: usize, total: usize) -> String {
    let mut out = format!(
        "Timetable {} of {total} ({} credits)",
        index + 1,
        timetable.total_credits
    );
    for (day, meetings) in timetable.meetings_by_day() {
        out.push_str(&format!("\n  {day}"));
        for (slot, block) in meetings {
            out.push_str(&format!(
                "\n    {}-{}  {} [{}] {}",
                block.start_time, block.end_time, slot.course_code, slot.slot_number, slot.faculty_name
            ));
        }
    }
    out
}

fn export(state: &SessionState, path: Option<PathBuf>, export_dir: &Path) {
    let (Some(index), Some(timetable)) = (state.cursor().index(), state.active_timetable()) else {
        eprintln!("✗ No timetable to export");
        return;
    };
    let path = path.unwrap_or_else(|| export_dir.join(format!("timetable-{}.json", index + 1)));
    match write_json(&path, timetable) {
        Ok(()) => println!("✓ Exported to {}", path.display()),
        Err(e) => eprintln!("✗ Failed to export {}: {e}", path.display()),
    }
}

/// Write `timetable` as pretty JSON, creating parent directories
pub fn write_json(path: &Path, timetable: &Timetable) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(timetable)?)?;
    verbose!("Wrote {}", path.display());
    Ok(())
}
