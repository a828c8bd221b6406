//! Scan core - rules, walking, age classification, cycle engine
//!
//! One cycle evaluates every configured rule independently: walk the
//! rule's folder, stat each file, classify its age against the rule's
//! threshold. A failing rule is folded into its own result and never
//! blocks sibling rules. No state is carried between cycles.

pub mod age;
pub mod engine;
pub mod error;
pub mod rule;
pub mod types;
pub mod walker;

// Re-exports for CLI usage
pub use age::{classify, format_age, AgeClass};
pub use engine::{evaluate_rule, run_cycle, CycleOptions};
pub use error::ScanError;
pub use rule::{load_rules, parse_rules, FolderRule, RuleParseError, SkippedLine};
pub use types::{CycleStats, FileObservation, ScanResult};
pub use walker::{CancelToken, FileEntry, FileWalk};
