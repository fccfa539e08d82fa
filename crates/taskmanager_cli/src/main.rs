//! `taskmanager` command-line entry point.
//!
//! # Responsibility
//! - Load configuration and start logging.
//! - Run exactly one command inside one database transaction.
//! - Map failures onto `Error: ...` on stderr and exit code 1.
//!
//! # Invariants
//! - The transaction commits only after the command succeeded; every other
//!   path rolls back when it is dropped.
//! - Usage errors are reported by clap with exit code 2.

mod args;
mod commands;
mod render;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;
use std::time::Instant;
use taskmanager_core::{
    init_logging, open_db, Config, LogTarget, ServiceError, ServicePolicy, SqliteStore,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();
    let started_at = Instant::now();

    match run(cli) {
        Ok(output) => {
            info!(
                "event=command module=cli status=ok command=\"{}\" duration_ms={}",
                command_name,
                started_at.elapsed().as_millis()
            );
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let (kind, field) = match err.downcast_ref::<ServiceError>() {
                Some(service_err) => (service_err.kind(), service_err.field().unwrap_or("-")),
                None => ("internal_error", "-"),
            };
            error!(
                "event=command module=cli status=error command=\"{}\" error_kind={} field={} error={:#}",
                command_name, kind, field, err
            );
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let config = Config::load(cli.config.as_deref())?;
    start_logging(&config);

    let mut conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;
    let tx = conn.transaction()?;
    let store = SqliteStore::try_new(&tx)?;
    let today = chrono::Local::now().date_naive();

    let output = commands::execute(cli.command, store, &ServicePolicy::from(&config), today)?;
    tx.commit()?;
    Ok(output)
}

fn start_logging(config: &Config) {
    match init_logging(&config.log_level, config.log_file.as_deref()) {
        Ok(LogTarget::Stderr {
            fallback_reason: Some(reason),
        }) => warn!(
            "event=logging_fallback module=cli status=degraded reason=\"{}\"",
            reason
        ),
        Ok(_) => {}
        Err(reason) => eprintln!("Warning: logging disabled: {reason}"),
    }
}
