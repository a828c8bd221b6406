//! Run command - one scan cycle over the configured rules
//!
//! Loads the rules file, evaluates every rule, reports through the
//! selected sink and prints a summary. The exit code carries the
//! verdict: 0 clean, 1 stale files found, 2 a rule failed to scan.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use comfy_table::Color;

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_time_absolute, print_table_colored};
use stalewatch::scan::age::format_age;
use stalewatch::{
    load_rules, report_cycle, run_cycle, CancelToken, CycleOptions, JsonLineSink, ScanResult,
    TracingSink,
};

/// Arguments for the run command
#[derive(Debug)]
pub struct RunArgs {
    pub rules: PathBuf,
    pub json: bool,
    pub quiet: bool,
    pub parallel: bool,
    pub rule_timeout_secs: Option<u64>,
}

/// Execute one scan cycle and report it.
pub fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let (rules, skipped) = load_rules(&args.rules)
        .map_err(|e| HelpfulError::rules_file_unreadable(&args.rules, &e.to_string()))?;
    if rules.is_empty() {
        return Err(HelpfulError::no_rules_configured(&args.rules).into());
    }
    if !skipped.is_empty() && !args.quiet {
        eprintln!(
            "Skipped {} malformed rule line(s); run 'stalewatch check' for details",
            skipped.len()
        );
    }

    let options = CycleOptions {
        parallel: args.parallel,
        rule_timeout: args.rule_timeout_secs.map(Duration::from_secs),
    };
    let cancel = CancelToken::new();
    let results = run_cycle(&rules, options, &cancel);

    if args.json {
        let sink = JsonLineSink::new(io::stdout());
        report_cycle(&results, &sink, &sink);
    } else {
        let sink = TracingSink;
        report_cycle(&results, &sink, &sink);
        if args.quiet {
            output_quiet(&results);
        } else {
            output_table(&results);
        }
    }

    Ok(exit_code(&results))
}

/// 0 = clean, 1 = stale files found, 2 = at least one rule failed.
pub fn exit_code(results: &[ScanResult]) -> ExitCode {
    if results.iter().any(|r| r.is_err()) {
        ExitCode::from(2)
    } else if results.iter().any(|r| !r.stale_files.is_empty()) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Output just stale file paths (quiet mode)
fn output_quiet(results: &[ScanResult]) {
    for result in results {
        for file in &result.stale_files {
            println!("{}", file.path.display());
        }
    }
}

/// Output as formatted table with per-rule failures listed after it
fn output_table(results: &[ScanResult]) {
    let stale_total: usize = results.iter().map(|r| r.stale_files.len()).sum();

    if stale_total == 0 {
        println!(
            "No stale files in {} rule(s)",
            results.iter().filter(|r| !r.is_err()).count()
        );
    } else {
        println!("Found {} stale file(s)", stale_total);
        println!();

        let headers = &["File", "Age", "Modified", "Rule"];
        let rows: Vec<Vec<(String, Option<Color>)>> = results
            .iter()
            .flat_map(|result| {
                result.stale_files.iter().map(|file| {
                    vec![
                        (file.path.display().to_string(), None),
                        (format_age(file.age), Some(Color::Yellow)),
                        (format_time_absolute(file.modified), None),
                        (result.rule.path.display().to_string(), Some(Color::Grey)),
                    ]
                })
            })
            .collect();
        print_table_colored(headers, rows);
    }

    for result in results.iter().filter(|r| r.is_err()) {
        if let Some(error) = &result.error {
            println!(
                "Rule '{}' failed: {}",
                result.rule.path.display(),
                error
            );
        }
    }
}
