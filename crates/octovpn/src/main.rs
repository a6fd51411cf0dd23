mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbosity)))
}

fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Stderr plus a numbered log file under `log_dir`. The guard flushes the
/// file writer and must outlive the session.
fn init_tracing_with_file(verbosity: u8, log_dir: &Path) -> Result<(WorkerGuard, PathBuf), CliError> {
    std::fs::create_dir_all(log_dir)?;
    let file_name = next_log_name(log_dir)?;
    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The file always gets at least info, regardless of -v.
    let file_level = level(verbosity.max(1));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter(verbosity)),
        )
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(file_level)),
        )
        .init();

    Ok((guard, log_dir.join(file_name)))
}

/// `octovpn.<n>.log`, numbered after the files already present.
fn next_log_name(log_dir: &Path) -> Result<String, CliError> {
    let existing = std::fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("octovpn."))
        .count();
    Ok(format!("octovpn.{existing}.log"))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions need neither settings nor a session
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            init_tracing(cli.global.verbose);
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "octovpn", &mut std::io::stdout());
            Ok(())
        }

        Command::Run => {
            let settings = config::resolve_settings(&cli.global)?;
            let (_guard, log_file) = init_tracing_with_file(cli.global.verbose, &settings.logs_dir())?;
            tracing::info!(log_file = %log_file.display(), "logging to file");
            commands::dispatch(Command::Run, &settings, &cli.global).await
        }

        cmd => {
            init_tracing(cli.global.verbose);
            let settings = config::resolve_settings(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &settings, &cli.global).await
        }
    }
}
