//! Stalewatch launcher
//!
//! Polling stale-file monitor: each cycle walks the configured folders,
//! classifies file ages against per-folder thresholds, and reports
//! per-file age metrics plus one aggregated alert per folder.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use stalewatch_logging::LogConfig;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "stalewatch", about = "Stale-file monitor for configured folders")]
struct Cli {
    /// Verbose console logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single scan cycle and report the results
    Run {
        /// Rules file, one path|recursive|thresholdMinutes per line
        #[arg(long, env = "STALEWATCH_RULES")]
        rules: PathBuf,
        /// Emit metrics and events as JSON lines on stdout
        #[arg(long)]
        json: bool,
        /// Print stale file paths only
        #[arg(long)]
        quiet: bool,
        /// Evaluate rules on one thread each
        #[arg(long)]
        parallel: bool,
        /// Per-rule wall-clock budget in seconds (parallel mode)
        #[arg(long)]
        rule_timeout_secs: Option<u64>,
    },
    /// Scan repeatedly at a fixed interval until interrupted
    Watch {
        /// Rules file, re-read at the start of every cycle
        #[arg(long, env = "STALEWATCH_RULES")]
        rules: PathBuf,
        /// Seconds between cycle starts
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
        /// Emit metrics and events as JSON lines on stdout
        #[arg(long)]
        json: bool,
        /// Evaluate rules on one thread each
        #[arg(long)]
        parallel: bool,
        /// Per-rule wall-clock budget in seconds (parallel mode)
        #[arg(long)]
        rule_timeout_secs: Option<u64>,
    },
    /// Validate a rules file and list what it configures
    Check {
        /// Rules file to validate
        #[arg(long, env = "STALEWATCH_RULES")]
        rules: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // JSON and quiet modes own stdout; keep the console at warnings so
    // log lines do not interleave with machine output.
    let quiet_console = matches!(
        &cli.command,
        Command::Run { json: true, .. }
            | Command::Run { quiet: true, .. }
            | Command::Watch { json: true, .. }
            | Command::Check { json: true, .. }
    );

    if let Err(err) = stalewatch_logging::init_logging(LogConfig {
        app_name: "stalewatch",
        verbose: cli.verbose,
        quiet_console,
    }) {
        eprintln!("Failed to initialize logging: {:#}", err);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Run {
            rules,
            json,
            quiet,
            parallel,
            rule_timeout_secs,
        } => cli::run::run(cli::run::RunArgs {
            rules,
            json,
            quiet,
            parallel,
            rule_timeout_secs,
        }),
        Command::Watch {
            rules,
            interval_secs,
            json,
            parallel,
            rule_timeout_secs,
        } => cli::watch::run(cli::watch::WatchArgs {
            rules,
            interval_secs,
            json,
            parallel,
            rule_timeout_secs,
        }),
        Command::Check { rules, json } => cli::check::run(cli::check::CheckArgs { rules, json }),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(2)
        }
    }
}
