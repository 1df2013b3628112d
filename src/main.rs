//! CLI entry point for repofetch.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use repofetch_core::session::{CrawlController, CrawlRequest, SessionOutcome, Summary};
use tracing::{debug, info, warn};

mod cli;
mod config;
mod progress;
mod terminal;

use cli::Args;
use progress::ProgressReporter;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let no_color = terminal::is_no_color_requested(&args);
    terminal::init_tracing(args.default_log_level(), no_color);
    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let file_config = config::load_default_file_config()?;
    let settings = config::resolve_settings(&args, file_config.as_ref())?;
    debug!(?settings, from_file = file_config.is_some(), "settings resolved");

    let controller = CrawlController::new()
        .with_timeouts(settings.connect_timeout, settings.read_timeout)
        .with_transfer_delay(settings.transfer_delay);
    let mut handle = controller.spawn(CrawlRequest {
        repository: args.repository.clone(),
        patterns: settings.patterns.clone(),
        output_dir: settings.output_dir.clone(),
        credential: args.token.clone(),
        layout: settings.layout,
    });

    let cancel = handle.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current request and stopping");
            cancel.cancel();
        }
    });

    let mut reporter = ProgressReporter::new(terminal::should_show_progress(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    ));
    while let Some(event) = handle.events.recv().await {
        reporter.handle(&event);
    }

    let outcome = handle.join.await.context("crawl task stopped unexpectedly")?;
    report(&outcome, &settings.output_dir);
    Ok(ExitCode::from(exit_status(&outcome)))
}

fn report(outcome: &SessionOutcome, output_dir: &std::path::Path) {
    match outcome {
        SessionOutcome::Completed(summary) => {
            info!(
                matched = summary.matched,
                downloaded = summary.downloaded,
                failed = summary.failed,
                "Download complete"
            );
            println!("{}", summary_line(summary, output_dir));
        }
        SessionOutcome::NoMatches { patterns } => {
            println!("No files matching {patterns} were found.");
        }
        SessionOutcome::Cancelled(summary) => {
            println!("Cancelled. {}", summary_line(summary, output_dir));
        }
        SessionOutcome::Failed { title, message, .. } => {
            eprintln!("{title}: {message}");
        }
    }
}

fn summary_line(summary: &Summary, output_dir: &std::path::Path) -> String {
    format!(
        "Downloaded {} of {} file(s) into {} ({} failed).",
        summary.downloaded,
        summary.matched,
        output_dir.display(),
        summary.failed
    )
}

/// 0 when every matched file was saved (or nothing matched), 1 otherwise.
fn exit_status(outcome: &SessionOutcome) -> u8 {
    match outcome {
        SessionOutcome::Completed(summary) if summary.failed == 0 => 0,
        SessionOutcome::NoMatches { .. } => 0,
        _ => 1,
    }
}
