//! CLI argument definitions for `IntelliPlan`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use intelliplan::config::ConfigOverrides;
use intelliplan::logger::Level;

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to
/// `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(Level::from(*self).as_str())
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `endpoint`, `export_dir`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Show scheduling service counters.
    Stats,
    /// List catalog courses.
    ///
    /// Matches SEARCH against course codes and names, ignoring case.
    Courses {
        /// Optional search term
        #[arg(value_name = "SEARCH")]
        search: Option<String>,
    },
    /// Start an interactive planning session.
    ///
    /// Reads commands from stdin; type `help` for the list.
    Plan {
        /// Preselect a course (repeatable)
        #[arg(long = "course", value_name = "ID")]
        courses: Vec<String>,

        /// Prefer a slot for a course, as COURSE:SLOT (repeatable)
        #[arg(long = "slot", value_name = "COURSE:SLOT", value_parser = parse_slot_pair)]
        slots: Vec<(String, String)>,

        /// Generate timetables before the first prompt
        #[arg(long)]
        generate: bool,
    },
}

/// Parse `COURSE:SLOT` into its two parts
pub fn parse_slot_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((course, slot)) if !course.trim().is_empty() && !slot.trim().is_empty() => {
            Ok((course.trim().to_string(), slot.trim().to_string()))
        }
        _ => Err(format!("expected COURSE:SLOT, got '{raw}'")),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "intelliplan",
    about = "IntelliPlan timetable planning client",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override config service endpoint
    #[arg(long = "config-endpoint", value_name = "URL")]
    pub config_endpoint: Option<String>,

    /// Override config service endpoint (short form)
    #[arg(long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Override config request timeout in seconds
    #[arg(long = "config-timeout-secs", value_name = "SECS")]
    pub config_timeout_secs: Option<u64>,

    /// Override config request timeout in seconds (short form)
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Override config export directory
    #[arg(long = "config-export-dir", value_name = "DIR")]
    pub config_export_dir: Option<PathBuf>,

    /// Override config export directory (short form)
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// Short-form flags (e.g., `--endpoint`) take precedence over long-form
    /// flags (e.g., `--config-endpoint`) when both are provided.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path_str = |p: &PathBuf| p.to_string_lossy().to_string();
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self.config_log_file.as_ref().map(path_str),
            verbose: self.config_verbose,
            endpoint: self
                .endpoint
                .clone()
                .or_else(|| self.config_endpoint.clone()),
            timeout_secs: self.timeout_secs.or(self.config_timeout_secs),
            export_dir: self
                .export_dir
                .as_ref()
                .or(self.config_export_dir.as_ref())
                .map(path_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_cli() -> Cli {
        Cli {
            log_level: None,
            verbose: false,
            debug_flag: false,
            log_file: None,
            config_level: None,
            config_log_file: None,
            config_verbose: None,
            config_endpoint: None,
            endpoint: None,
            config_timeout_secs: None,
            timeout_secs: None,
            config_export_dir: None,
            export_dir: None,
            command: Command::Stats,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = bare_cli().to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.endpoint.is_none());
        assert!(overrides.timeout_secs.is_none());
        assert!(overrides.export_dir.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let cli = Cli {
            config_level: Some(LogLevelArg::Debug),
            config_log_file: Some(PathBuf::from("/tmp/test.log")),
            config_verbose: Some(true),
            endpoint: Some("http://planner:9000".to_string()),
            timeout_secs: Some(5),
            export_dir: Some(PathBuf::from("/exports")),
            ..bare_cli()
        };

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.file, Some("/tmp/test.log".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.endpoint, Some("http://planner:9000".to_string()));
        assert_eq!(overrides.timeout_secs, Some(5));
        assert_eq!(overrides.export_dir, Some("/exports".to_string()));
    }

    #[test]
    fn test_short_form_precedence_over_long_form() {
        let cli = Cli {
            config_endpoint: Some("http://long:8000".to_string()),
            endpoint: Some("http://short:8000".to_string()),
            config_timeout_secs: Some(60),
            timeout_secs: Some(10),
            config_export_dir: Some(PathBuf::from("/long/out")),
            export_dir: Some(PathBuf::from("/short/out")),
            ..bare_cli()
        };

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.endpoint, Some("http://short:8000".to_string()));
        assert_eq!(overrides.timeout_secs, Some(10));
        assert_eq!(overrides.export_dir, Some("/short/out".to_string()));
    }

    #[test]
    fn test_long_form_when_short_form_absent() {
        let cli = Cli {
            config_endpoint: Some("http://long:8000".to_string()),
            config_timeout_secs: Some(60),
            config_export_dir: Some(PathBuf::from("/long/out")),
            ..bare_cli()
        };

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.endpoint, Some("http://long:8000".to_string()));
        assert_eq!(overrides.timeout_secs, Some(60));
        assert_eq!(overrides.export_dir, Some("/long/out".to_string()));
    }

    #[test]
    fn test_parse_slot_pair() {
        assert_eq!(
            parse_slot_pair("CS101:S2"),
            Ok(("CS101".to_string(), "S2".to_string()))
        );
        assert!(parse_slot_pair("CS101").is_err());
        assert!(parse_slot_pair(":S2").is_err());
    }

    #[test]
    fn test_plan_command_parses_repeated_flags() {
        let cli = Cli::try_parse_from([
            "intelliplan",
            "--endpoint",
            "http://planner:9000",
            "plan",
            "--course",
            "CS101",
            "--course",
            "MA201",
            "--slot",
            "CS101:S1",
            "--generate",
        ])
        .unwrap();

        match cli.command {
            Command::Plan {
                courses,
                slots,
                generate,
            } => {
                assert_eq!(courses, vec!["CS101", "MA201"]);
                assert_eq!(slots, vec![("CS101".to_string(), "S1".to_string())]);
                assert!(generate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
