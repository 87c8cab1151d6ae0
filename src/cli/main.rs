//! Command-line interface entry point for `IntelliPlan`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use intelliplan::config::Config;
use intelliplan::core::service::HttpSchedulerService;
use intelliplan::core::Session;
use intelliplan::info;
use intelliplan::logger::{self, Level, LoggingSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config; config falls back to warn inside logger::init
    let settings = LoggingSettings {
        level: args
            .log_level
            .map(Level::from)
            .or_else(|| config.logging.level.parse().ok()),
        debug: args.debug_flag,
        verbose: args.verbose || config.logging.verbose,
        file: args.log_file.clone().or_else(|| {
            (!config.logging.file.is_empty()).then(|| PathBuf::from(&config.logging.file))
        }),
    };
    if logger::init(&settings) {
        if let Some(path) = &settings.file {
            info!("File logging initialized at: {}", path.display());
        }
    } else if let Some(path) = &settings.file {
        eprintln!("✗ Failed to initialize file logging at: {}", path.display());
    }

    if let Command::Config { subcommand } = args.command {
        return if commands::config::run(subcommand, &mut config, &defaults) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let service = match HttpSchedulerService::from_config(&config.service) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            eprintln!("✗ {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Using scheduling service at {}", service.base_url());
    let session = Session::new(service);

    let ok = match args.command {
        Command::Config { .. } => true,
        Command::Stats => commands::catalog::stats(&session).await,
        Command::Courses { search } => commands::catalog::list(&session, search.as_deref()).await,
        Command::Plan {
            courses,
            slots,
            generate,
        } => {
            let export_dir = PathBuf::from(&config.paths.export_dir);
            let options = commands::plan::PlanOptions {
                courses,
                slots,
                generate,
                export_dir,
            };
            commands::plan::run(&session, options).await
        }
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
