use crate::engine::{PolicyReport, ResolvedFinding};
use crate::policy::Policy;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif spinners and colored output.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_policy_start(&self, _policy: Policy) {}
    fn on_scan_progress(&self, _files_found: usize) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_hash_start(&self, _total_files: usize) {}
    fn on_hash_progress(&self, _files_hashed: usize, _total_files: usize) {}
    fn on_hash_complete(&self, _groups: usize, _duration_secs: f64) {}
    fn on_policy_disabled(&self, _policy: Policy, _reason: &str) {}
    fn on_resolved(&self, _resolved: &ResolvedFinding) {}
    fn on_policy_complete(&self, _report: &PolicyReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
