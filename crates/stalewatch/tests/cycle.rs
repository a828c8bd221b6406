//! End-to-end cycle tests: rules parsing, scanning and reporting
//! exercised together against real temporary directories.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::{set_file_mtime, FileTime};
use tempfile::TempDir;

use stalewatch::{
    parse_rules, report_cycle, run_cycle, CancelToken, CycleOptions, EventSeverity, MemorySink,
};

fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn age_file(path: &Path, minutes: u64) {
    let mtime = SystemTime::now() - Duration::from_secs(minutes * 60);
    set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}

fn rules_for(lines: &[String]) -> Vec<stalewatch::FolderRule> {
    let (rules, skipped) = parse_rules(&lines.join("\n"));
    assert!(skipped.is_empty(), "unexpected skipped lines: {:?}", skipped);
    rules
}

#[test]
fn test_sixty_minute_threshold_scenario() {
    // a.txt modified 10 minutes ago, b.txt 70 minutes ago, threshold 60,
    // non-recursive: only b.txt is stale.
    let temp = TempDir::new().unwrap();
    let a = create_test_file(temp.path(), "a.txt", "fresh");
    let b = create_test_file(temp.path(), "b.txt", "old");
    age_file(&a, 10);
    age_file(&b, 70);

    let rules = rules_for(&[format!("{}|false|60", temp.path().display())]);
    let results = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert!(result.error.is_none());
    assert_eq!(result.stale_files.len(), 1);
    assert_eq!(result.stale_files[0].path, b);
    let age_mins = result.stale_files[0].age.as_secs() / 60;
    assert!((69..=71).contains(&age_mins), "age was {}m", age_mins);

    let sink = MemorySink::new();
    report_cycle(&results, &sink, &sink);

    // One metric for b.txt, value in seconds.
    let metrics = sink.metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].key, "file_age");
    assert_eq!(
        metrics[0].dimensions.get("File").unwrap(),
        &b.display().to_string()
    );
    assert!(
        (4100.0..4300.0).contains(&metrics[0].value),
        "value was {}",
        metrics[0].value
    );

    // One aggregated alert listing b.txt; a.txt absent from all output.
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, EventSeverity::Warning);
    assert!(events[0].description.contains("60 minutes"));
    assert!(events[0].properties.contains_key(&b.display().to_string()));
    assert!(!events[0].properties.contains_key(&a.display().to_string()));
}

#[test]
fn test_non_recursive_rule_never_reports_subdirectory_files() {
    let temp = TempDir::new().unwrap();
    let nested = create_test_file(temp.path(), "sub/very_old.txt", "x");
    age_file(&nested, 10_000);

    let rules = rules_for(&[format!("{}|false|60", temp.path().display())]);
    let results = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());
    assert!(results[0].stale_files.is_empty());
}

#[test]
fn test_recursive_rule_finds_arbitrarily_deep_files() {
    let temp = TempDir::new().unwrap();
    let nested = create_test_file(temp.path(), "a/b/c/d/e/old.txt", "x");
    age_file(&nested, 120);

    let rules = rules_for(&[format!("{}|true|60", temp.path().display())]);
    let results = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());
    assert_eq!(results[0].stale_files.len(), 1);
    assert_eq!(results[0].stale_files[0].path, nested);
}

#[test]
fn test_bad_path_rule_is_isolated_from_siblings() {
    let temp = TempDir::new().unwrap();
    let old = create_test_file(temp.path(), "old.txt", "x");
    age_file(&old, 120);

    let rules = rules_for(&[
        "/nonexistent/stalewatch|false|60".to_string(),
        format!("{}|false|60", temp.path().display()),
    ]);
    let results = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());

    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[0].stale_files.is_empty());
    assert_eq!(results[1].stale_files.len(), 1);

    let sink = MemorySink::new();
    report_cycle(&results, &sink, &sink);

    // The failed rule contributes one error event and no metrics; the
    // healthy rule still reports its stale file.
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].severity, EventSeverity::Error);
    assert!(events[0].description.contains("/nonexistent/stalewatch"));
    assert_eq!(events[1].severity, EventSeverity::Warning);
    assert_eq!(sink.metrics().len(), 1);
}

#[test]
fn test_cycles_are_idempotent_on_unchanged_filesystem() {
    let temp = TempDir::new().unwrap();
    let old_a = create_test_file(temp.path(), "old_a.txt", "x");
    let old_b = create_test_file(temp.path(), "sub/old_b.txt", "x");
    age_file(&old_a, 120);
    age_file(&old_b, 240);

    let rules = rules_for(&[format!("{}|true|60", temp.path().display())]);

    let paths = |results: &[stalewatch::ScanResult]| -> Vec<PathBuf> {
        results[0]
            .stale_files
            .iter()
            .map(|f| f.path.clone())
            .collect()
    };

    let first = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());
    let second = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());

    // A still-stale file is reported again on every cycle; there is no
    // cross-cycle memory to deduplicate it.
    assert_eq!(paths(&first), paths(&second));
    assert_eq!(paths(&first).len(), 2);
}

#[test]
fn test_malformed_lines_do_not_blind_other_folders() {
    let temp = TempDir::new().unwrap();
    let old = create_test_file(temp.path(), "old.txt", "x");
    age_file(&old, 120);

    let text = format!(
        "not|enough\n{}|false|60\n/tmp/x|true|NaN\n",
        temp.path().display()
    );
    let (rules, skipped) = parse_rules(&text);
    assert_eq!(rules.len(), 1);
    assert_eq!(skipped.len(), 2);

    let results = run_cycle(&rules, CycleOptions::default(), &CancelToken::new());
    assert_eq!(results[0].stale_files.len(), 1);
}

#[test]
fn test_parallel_cycle_reports_like_sequential() {
    let temp_a = TempDir::new().unwrap();
    let temp_b = TempDir::new().unwrap();
    let old = create_test_file(temp_b.path(), "old.txt", "x");
    age_file(&old, 120);

    let rules = rules_for(&[
        format!("{}|true|60", temp_a.path().display()),
        format!("{}|true|60", temp_b.path().display()),
    ]);
    let options = CycleOptions {
        parallel: true,
        rule_timeout: Some(Duration::from_secs(30)),
    };
    let results = run_cycle(&rules, options, &CancelToken::new());

    assert_eq!(results.len(), 2);
    assert!(results[0].stale_files.is_empty());
    assert_eq!(results[1].stale_files.len(), 1);

    let sink = MemorySink::new();
    report_cycle(&results, &sink, &sink);
    assert_eq!(sink.metrics().len(), 1);
    assert_eq!(sink.events().len(), 1);
}
