//! Rule evaluation and cycle orchestration
//!
//! `evaluate_rule` walks one folder and classifies every file it can
//! stat. Failures land in the returned result instead of propagating, so
//! one bad path never blocks the other rules of a cycle.

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};
use tracing::{info, warn};

use super::age::classify;
use super::error::ScanError;
use super::rule::FolderRule;
use super::types::{CycleStats, FileObservation, ScanResult};
use super::walker::{CancelToken, FileWalk};

/// Options for one scan cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Evaluate rules on one thread each instead of sequentially.
    pub parallel: bool,
    /// Per-rule wall-clock budget. Enforced in parallel mode, where a
    /// hung network mount on one rule must not starve the others.
    pub rule_timeout: Option<Duration>,
}

/// Evaluate one rule against the filesystem.
///
/// `now` is the single reference instant for every file in this rule's
/// walk, so a long enumeration cannot skew ages. Failures are folded
/// into the result, never raised past this boundary.
pub fn evaluate_rule(rule: &FolderRule, now: SystemTime, cancel: &CancelToken) -> ScanResult {
    let started = Instant::now();
    info!(
        path = %rule.path.display(),
        recursive = rule.recursive,
        threshold_minutes = rule.threshold_minutes,
        "Evaluating rule"
    );

    let walk = match FileWalk::new(&rule.path, rule.recursive, cancel.clone()) {
        Ok(walk) => walk,
        Err(err) => {
            warn!(path = %rule.path.display(), error = %err, "Rule evaluation failed");
            return ScanResult::failed(rule.clone(), err, started.elapsed());
        }
    };

    let threshold = rule.threshold();
    let mut stale_files = Vec::new();
    let mut files_seen = 0u64;

    for entry in walk {
        files_seen += 1;
        let verdict = classify(entry.modified, now, threshold);
        if verdict.is_stale {
            stale_files.push(FileObservation {
                path: entry.path,
                age: verdict.age,
                modified: entry.modified,
            });
        }
    }

    if cancel.is_cancelled() {
        return ScanResult::failed(rule.clone(), ScanError::Cancelled, started.elapsed());
    }

    ScanResult {
        rule: rule.clone(),
        stale_files,
        error: None,
        files_seen,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// Evaluate every rule of a cycle. Results come back in rule order.
pub fn run_cycle(rules: &[FolderRule], options: CycleOptions, cancel: &CancelToken) -> Vec<ScanResult> {
    let started = Instant::now();

    let results = if options.parallel && rules.len() > 1 {
        run_cycle_parallel(rules, options.rule_timeout, cancel)
    } else {
        rules
            .iter()
            .map(|rule| evaluate_rule(rule, SystemTime::now(), cancel))
            .collect()
    };

    let stats = CycleStats::collect(&results);
    info!(
        rules = stats.rules_evaluated,
        failed = stats.rules_failed,
        files_seen = stats.files_seen,
        stale = stats.stale_files,
        duration_ms = started.elapsed().as_millis() as u64,
        "Cycle complete"
    );

    results
}

/// One thread per rule, joined through a channel so a slow rule can be
/// abandoned at its budget while its siblings still report.
fn run_cycle_parallel(
    rules: &[FolderRule],
    rule_timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Vec<ScanResult> {
    struct Pending {
        rule: FolderRule,
        cancel: CancelToken,
        rx: mpsc::Receiver<ScanResult>,
        started: Instant,
    }

    let mut pending = Vec::with_capacity(rules.len());
    for rule in rules {
        let (tx, rx) = mpsc::channel();
        let rule_cancel = cancel.child();
        let started = Instant::now();
        {
            let rule = rule.clone();
            let rule_cancel = rule_cancel.clone();
            std::thread::spawn(move || {
                let result = evaluate_rule(&rule, SystemTime::now(), &rule_cancel);
                let _ = tx.send(result);
            });
        }
        pending.push(Pending {
            rule: rule.clone(),
            cancel: rule_cancel,
            rx,
            started,
        });
    }

    pending
        .into_iter()
        .map(|Pending { rule, cancel, rx, started }| match rule_timeout {
            Some(budget) => {
                let wait = budget.saturating_sub(started.elapsed());
                match rx.recv_timeout(wait) {
                    Ok(result) => result,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        warn!(path = %rule.path.display(), "Rule evaluation exceeded its budget, cancelling");
                        // The walk thread exits at its next cancel check;
                        // its directory handles are released when the
                        // iterator drops.
                        cancel.cancel();
                        ScanResult::failed(
                            rule,
                            ScanError::Timeout {
                                budget_secs: budget.as_secs(),
                            },
                            started.elapsed(),
                        )
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        ScanResult::failed(rule, thread_lost(), started.elapsed())
                    }
                }
            }
            None => match rx.recv() {
                Ok(result) => result,
                Err(_) => ScanResult::failed(rule, thread_lost(), started.elapsed()),
            },
        })
        .collect()
}

fn thread_lost() -> ScanError {
    ScanError::Io(io::Error::new(
        io::ErrorKind::Other,
        "rule evaluation thread exited before reporting",
    ))
}
