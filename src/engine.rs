use crate::action::{ActionError, ActionExecutor, Outcome};
use crate::analysis::{find_duplicate_groups, find_same_name_groups};
use crate::config::AppConfig;
use crate::confirm::{ConfirmState, ConfirmationController, DecisionProvider};
use crate::finding::{Action, Detail, Finding, GroupMember};
use crate::policy::{AttributePolicy, EmptyPolicy, Evaluator, Policy, RenamePolicy, TempPolicy};
use crate::progress::ProgressReporter;
use crate::record::FileRecord;
use crate::scanner::FileSource;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What happened to one finding.
#[derive(Debug)]
pub enum Resolution {
    Applied(Outcome),
    Declined,
    Failed(ActionError),
}

#[derive(Debug)]
pub struct ResolvedFinding {
    pub finding: Finding,
    /// False when the finding was auto-applied under always-apply.
    pub prompted: bool,
    pub resolution: Resolution,
}

#[derive(Debug)]
pub struct PolicyReport {
    pub policy: Policy,
    /// Set when the policy could not run because of bad configuration.
    pub disabled: Option<String>,
    pub resolved: Vec<ResolvedFinding>,
}

impl PolicyReport {
    fn new(policy: Policy) -> Self {
        Self {
            policy,
            disabled: None,
            resolved: Vec::new(),
        }
    }

    pub fn findings(&self) -> usize {
        self.resolved.len()
    }

    pub fn applied(&self) -> usize {
        self.count(|r| matches!(r, Resolution::Applied(_)))
    }

    pub fn declined(&self) -> usize {
        self.count(|r| matches!(r, Resolution::Declined))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, Resolution::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&Resolution) -> bool) -> usize {
        self.resolved
            .iter()
            .filter(|r| predicate(&r.resolution))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub policies: Vec<PolicyReport>,
}

impl RunSummary {
    pub fn report(&self, policy: Policy) -> Option<&PolicyReport> {
        self.policies.iter().find(|r| r.policy == policy)
    }

    pub fn total_findings(&self) -> usize {
        self.policies.iter().map(PolicyReport::findings).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.policies.iter().map(PolicyReport::failed).sum()
    }
}

/// Drives policies over a file source: evaluate, confirm, apply.
pub struct CleanEngine {
    config: AppConfig,
    assume_yes: bool,
    executor: ActionExecutor,
}

impl CleanEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            assume_yes: false,
            executor: ActionExecutor,
        }
    }

    /// Start every policy in always-apply.
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run `policies` in the given order. Failures stay local to the file or
    /// policy they hit; the sequence always runs to the end.
    pub fn run(
        &self,
        policies: &[Policy],
        source: &dyn FileSource,
        decisions: &mut dyn DecisionProvider,
        reporter: &dyn ProgressReporter,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        for &policy in policies {
            summary
                .policies
                .push(self.run_policy(policy, source, decisions, reporter));
        }
        summary
    }

    pub fn run_policy(
        &self,
        policy: Policy,
        source: &dyn FileSource,
        decisions: &mut dyn DecisionProvider,
        reporter: &dyn ProgressReporter,
    ) -> PolicyReport {
        info!("Checking for {}...", policy.description());
        reporter.on_policy_start(policy);
        let mut report = PolicyReport::new(policy);

        let findings = match self.findings(policy, source, reporter) {
            Ok(findings) => findings,
            Err(reason) => {
                error!("Policy '{}' disabled: {}", policy, reason);
                reporter.on_policy_disabled(policy, &reason);
                report.disabled = Some(reason);
                reporter.on_policy_complete(&report);
                return report;
            }
        };
        debug!("{} finding(s) for {}", findings.len(), policy);

        let mut controller = if self.assume_yes {
            ConfirmationController::always(policy)
        } else {
            ConfirmationController::new(policy)
        };

        for finding in findings {
            let resolved = self.resolve(finding, &mut controller, decisions);
            reporter.on_resolved(&resolved);
            report.resolved.push(resolved);
        }

        info!(
            "{}: {} found, {} applied, {} declined, {} failed",
            policy,
            report.findings(),
            report.applied(),
            report.declined(),
            report.failed()
        );
        reporter.on_policy_complete(&report);
        report
    }

    fn resolve(
        &self,
        finding: Finding,
        controller: &mut ConfirmationController,
        decisions: &mut dyn DecisionProvider,
    ) -> ResolvedFinding {
        let prompted = controller.state() == ConfirmState::Prompting;
        let resolution = if controller.authorize(&finding, decisions) {
            match self.executor.apply(&finding) {
                Ok(outcome) => Resolution::Applied(outcome),
                Err(e) => {
                    if e.is_collision() {
                        warn!("{}", e);
                    } else {
                        error!("{}", e);
                    }
                    Resolution::Failed(e)
                }
            }
        } else {
            Resolution::Declined
        };

        ResolvedFinding {
            finding,
            prompted,
            resolution,
        }
    }

    /// Evaluate one policy without acting on anything.
    ///
    /// `Err` carries the reason a policy is disabled by its configuration.
    pub fn findings(
        &self,
        policy: Policy,
        source: &dyn FileSource,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<Finding>, String> {
        match policy {
            Policy::Empty => Ok(self.evaluate(&EmptyPolicy, source, reporter)),
            Policy::Temp => Ok(self.evaluate(
                &TempPolicy::new(&self.config.temp_extensions),
                source,
                reporter,
            )),
            Policy::Attributes => {
                let evaluator =
                    AttributePolicy::from_symbolic(&self.config.desired_mode).map_err(|e| {
                        format!("invalid desired_mode '{}': {}", self.config.desired_mode, e)
                    })?;
                Ok(self.evaluate(&evaluator, source, reporter))
            }
            Policy::Rename => {
                let evaluator =
                    RenamePolicy::new(&self.config.problematic_chars, &self.config.substitute_char)
                        .map_err(|e| e.to_string())?;
                Ok(self.evaluate(&evaluator, source, reporter))
            }
            Policy::Duplicates => Ok(self.duplicate_findings(source, reporter)),
            Policy::SameName => Ok(self.same_name_findings(source, reporter)),
        }
    }

    fn evaluate(
        &self,
        evaluator: &dyn Evaluator,
        source: &dyn FileSource,
        reporter: &dyn ProgressReporter,
    ) -> Vec<Finding> {
        scan_records(source, reporter)
            .iter()
            .filter_map(|record| evaluator.evaluate(record))
            .collect()
    }

    fn duplicate_findings(
        &self,
        source: &dyn FileSource,
        reporter: &dyn ProgressReporter,
    ) -> Vec<Finding> {
        let records = scan_records(source, reporter);
        let hash_start = Instant::now();
        let groups = find_duplicate_groups(records, reporter);
        reporter.on_hash_complete(groups.len(), hash_start.elapsed().as_secs_f64());

        groups
            .iter()
            .flat_map(|group| {
                let retained = member(group.retained());
                group.candidates().iter().map(move |copy| Finding {
                    policy: Policy::Duplicates,
                    path: copy.path.clone(),
                    size: copy.size,
                    action: Action::Delete,
                    detail: Detail::Duplicate {
                        digest: group.key,
                        retained: retained.clone(),
                        modified: copy.modified,
                        group_size: group.len(),
                    },
                })
            })
            .collect()
    }

    fn same_name_findings(
        &self,
        source: &dyn FileSource,
        reporter: &dyn ProgressReporter,
    ) -> Vec<Finding> {
        let groups = find_same_name_groups(scan_records(source, reporter));

        groups
            .iter()
            .flat_map(|group| {
                let retained = member(group.retained());
                group.candidates().iter().map(move |older| Finding {
                    policy: Policy::SameName,
                    path: older.path.clone(),
                    size: older.size,
                    action: Action::Delete,
                    detail: Detail::SameName {
                        retained: retained.clone(),
                        modified: older.modified,
                        group_size: group.len(),
                    },
                })
            })
            .collect()
    }
}

fn member(record: &FileRecord) -> GroupMember {
    GroupMember {
        path: record.path.clone(),
        modified: record.modified,
    }
}

/// One fresh pass over the source. Paths that cannot be stat'ed are skipped.
fn scan_records(source: &dyn FileSource, reporter: &dyn ProgressReporter) -> Vec<FileRecord> {
    let scan_start = Instant::now();
    let mut records = Vec::new();

    for path in source.files() {
        match FileRecord::read(&path) {
            Ok(record) => {
                records.push(record);
                reporter.on_scan_progress(records.len());
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    let duration = scan_start.elapsed().as_secs_f64();
    debug!("Scanned {} files in {:.2}s", records.len(), duration);
    reporter.on_scan_complete(records.len(), duration);
    records
}
