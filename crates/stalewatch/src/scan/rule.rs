//! Folder rules and rules-file parsing
//!
//! The monitoring host hands us one rule per line in the form
//! `path|recursive|thresholdMinutes`. Rules are re-read at the start of
//! every cycle, so edits take effect without a restart.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// One configured (path, recursion, threshold) triple, evaluated
/// independently each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRule {
    /// Folder to scan. Not required to exist at config time.
    pub path: PathBuf,
    /// Descend into subdirectories?
    pub recursive: bool,
    /// Files older than this many minutes are stale.
    pub threshold_minutes: u64,
}

impl FolderRule {
    /// The staleness threshold as a duration.
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_minutes.saturating_mul(60))
    }

    /// Parse a `path|recursive|thresholdMinutes` line.
    ///
    /// The `recursive` field follows the host's contract: the literal
    /// token `true` enables recursion, any other token disables it.
    pub fn parse(line: &str) -> std::result::Result<Self, RuleParseError> {
        let mut fields = line.split('|');
        let (path, recursive, minutes) =
            match (fields.next(), fields.next(), fields.next(), fields.next()) {
                (Some(p), Some(r), Some(m), None) => (p, r, m),
                _ => {
                    return Err(RuleParseError::FieldCount {
                        found: line.split('|').count(),
                    })
                }
            };

        let path = path.trim();
        if path.is_empty() {
            return Err(RuleParseError::EmptyPath);
        }

        let recursive = recursive.trim() == "true";

        let minutes = minutes.trim();
        let threshold_minutes = minutes
            .parse::<u64>()
            .map_err(|_| RuleParseError::InvalidThreshold {
                value: minutes.to_string(),
            })?;

        Ok(Self {
            path: expand_rule_path(Path::new(path)),
            recursive,
            threshold_minutes,
        })
    }
}

/// Why a rule line was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("expected 3 '|'-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("rule path is empty")]
    EmptyPath,

    #[error("threshold is not a non-negative integer: '{value}'")]
    InvalidThreshold { value: String },
}

/// A rule line that failed to parse, with its 1-based line number.
#[derive(Debug, Clone)]
pub struct SkippedLine {
    pub line_no: usize,
    pub line: String,
    pub error: RuleParseError,
}

/// Parse a whole rules document.
///
/// Blank lines and `#` comments are ignored. Malformed lines are skipped
/// with a warning and reported back so one bad line never blinds the
/// monitoring of every other folder.
pub fn parse_rules(text: &str) -> (Vec<FolderRule>, Vec<SkippedLine>) {
    let mut rules = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match FolderRule::parse(line) {
            Ok(rule) => rules.push(rule),
            Err(error) => {
                warn!(
                    line_no = idx + 1,
                    line = %line,
                    error = %error,
                    "Skipping malformed rule line"
                );
                skipped.push(SkippedLine {
                    line_no: idx + 1,
                    line: line.to_string(),
                    error,
                });
            }
        }
    }

    (rules, skipped)
}

/// Load and parse a rules file.
pub fn load_rules(path: &Path) -> io::Result<(Vec<FolderRule>, Vec<SkippedLine>)> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rules(&text))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_rule_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path.strip_prefix("~").unwrap_or(path));
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_rule() {
        let rule = FolderRule::parse("/data/in|true|60").unwrap();
        assert_eq!(rule.path, PathBuf::from("/data/in"));
        assert!(rule.recursive);
        assert_eq!(rule.threshold_minutes, 60);
        assert_eq!(rule.threshold(), Duration::from_secs(3600));
    }

    #[test]
    fn test_recursive_token_coercion() {
        // Only the literal token "true" enables recursion.
        assert!(FolderRule::parse("/d|true|5").unwrap().recursive);
        assert!(!FolderRule::parse("/d|false|5").unwrap().recursive);
        assert!(!FolderRule::parse("/d|TRUE|5").unwrap().recursive);
        assert!(!FolderRule::parse("/d|yes|5").unwrap().recursive);
        assert!(!FolderRule::parse("/d||5").unwrap().recursive);
    }

    #[test]
    fn test_parse_zero_threshold() {
        let rule = FolderRule::parse("/d|false|0").unwrap();
        assert_eq!(rule.threshold(), Duration::ZERO);
    }

    #[test]
    fn test_parse_field_count() {
        assert_eq!(
            FolderRule::parse("/data/in|true").unwrap_err(),
            RuleParseError::FieldCount { found: 2 }
        );
        assert_eq!(
            FolderRule::parse("/data/in|true|60|extra").unwrap_err(),
            RuleParseError::FieldCount { found: 4 }
        );
        assert!(matches!(
            FolderRule::parse("no pipes here").unwrap_err(),
            RuleParseError::FieldCount { found: 1 }
        ));
    }

    #[test]
    fn test_parse_bad_threshold() {
        assert_eq!(
            FolderRule::parse("/d|true|soon").unwrap_err(),
            RuleParseError::InvalidThreshold {
                value: "soon".to_string()
            }
        );
        // Negative thresholds are rejected, not clamped.
        assert!(matches!(
            FolderRule::parse("/d|true|-5").unwrap_err(),
            RuleParseError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_parse_empty_path() {
        assert_eq!(
            FolderRule::parse("|true|60").unwrap_err(),
            RuleParseError::EmptyPath
        );
        assert_eq!(
            FolderRule::parse("   |true|60").unwrap_err(),
            RuleParseError::EmptyPath
        );
    }

    #[test]
    fn test_parse_rules_skips_malformed_lines() {
        let text = "\
# folders watched by the ops team
/data/in|false|60

/data/archive|true|1440
oops-no-pipes
/data/out|true|not-a-number
";
        let (rules, skipped) = parse_rules(text);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].path, PathBuf::from("/data/in"));
        assert_eq!(rules[1].path, PathBuf::from("/data/archive"));

        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].line_no, 5);
        assert_eq!(skipped[1].line_no, 6);
        assert!(matches!(
            skipped[1].error,
            RuleParseError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_parse_rules_empty_document() {
        let (rules, skipped) = parse_rules("\n# nothing configured\n");
        assert!(rules.is_empty());
        assert!(skipped.is_empty());
    }
}
