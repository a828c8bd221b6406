//! Check command - validate a rules file without scanning
//!
//! Lists every rule the file configures and every line that would be
//! skipped, so a config edit can be verified before the next cycle
//! picks it up.

use std::path::PathBuf;
use std::process::ExitCode;

use comfy_table::Color;
use serde::Serialize;

use crate::cli::error::HelpfulError;
use crate::cli::output::print_table_colored;
use stalewatch::{load_rules, FolderRule, SkippedLine};

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    pub rules: PathBuf,
    pub json: bool,
}

#[derive(Serialize)]
struct CheckReport {
    rules_file: String,
    rules: Vec<RuleView>,
    skipped: Vec<SkippedView>,
}

#[derive(Serialize)]
struct RuleView {
    path: String,
    recursive: bool,
    threshold_minutes: u64,
    /// Informational only; a rule path does not have to exist at config time.
    exists: bool,
}

#[derive(Serialize)]
struct SkippedView {
    line_no: usize,
    line: String,
    error: String,
}

/// Validate the rules file. Exit code 1 when any line was skipped.
pub fn run(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let (rules, skipped) = load_rules(&args.rules)
        .map_err(|e| HelpfulError::rules_file_unreadable(&args.rules, &e.to_string()))?;

    if args.json {
        output_json(&args, &rules, &skipped)?;
    } else {
        output_table(&args, &rules, &skipped);
    }

    if skipped.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn output_json(
    args: &CheckArgs,
    rules: &[FolderRule],
    skipped: &[SkippedLine],
) -> anyhow::Result<()> {
    let report = CheckReport {
        rules_file: args.rules.display().to_string(),
        rules: rules
            .iter()
            .map(|rule| RuleView {
                path: rule.path.display().to_string(),
                recursive: rule.recursive,
                threshold_minutes: rule.threshold_minutes,
                exists: rule.path.is_dir(),
            })
            .collect(),
        skipped: skipped
            .iter()
            .map(|s| SkippedView {
                line_no: s.line_no,
                line: s.line.clone(),
                error: s.error.to_string(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn output_table(args: &CheckArgs, rules: &[FolderRule], skipped: &[SkippedLine]) {
    println!(
        "{}: {} rule(s), {} skipped line(s)",
        args.rules.display(),
        rules.len(),
        skipped.len()
    );

    if !rules.is_empty() {
        println!();
        let headers = &["Path", "Recursive", "Threshold", "Status"];
        let rows: Vec<Vec<(String, Option<Color>)>> = rules
            .iter()
            .map(|rule| {
                let (status, color) = if rule.path.is_dir() {
                    ("ok".to_string(), Some(Color::Green))
                } else {
                    ("missing".to_string(), Some(Color::Yellow))
                };
                vec![
                    (rule.path.display().to_string(), None),
                    (rule.recursive.to_string(), None),
                    (format!("{}m", rule.threshold_minutes), None),
                    (status, color),
                ]
            })
            .collect();
        print_table_colored(headers, rows);
    }

    for line in skipped {
        println!("line {}: {} ({})", line.line_no, line.line, line.error);
    }
}
