use crate::finding::Finding;
use crate::policy::Policy;
use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Operator response to a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Decline,
    /// Confirm this finding and every later one for the same policy.
    Always,
}

/// Source of operator decisions. The terminal prompt lives in the binary;
/// tests script their answers.
pub trait DecisionProvider {
    fn decide(&mut self, finding: &Finding) -> io::Result<Decision>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState {
    Prompting,
    /// Terminal for the rest of the run.
    AlwaysApply,
}

/// Per-policy authorization state machine.
///
/// Every policy run owns its own controller, so escalating one policy to
/// always-apply never silences another.
#[derive(Debug)]
pub struct ConfirmationController {
    policy: Policy,
    state: ConfirmState,
}

impl ConfirmationController {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            state: ConfirmState::Prompting,
        }
    }

    /// A controller that starts out escalated (`--yes`).
    pub fn always(policy: Policy) -> Self {
        Self {
            policy,
            state: ConfirmState::AlwaysApply,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn state(&self) -> ConfirmState {
        self.state
    }

    /// Returns whether the finding's action may be applied.
    ///
    /// A provider error counts as a decline and leaves the state unchanged.
    pub fn authorize(&mut self, finding: &Finding, provider: &mut dyn DecisionProvider) -> bool {
        if self.state == ConfirmState::AlwaysApply {
            return true;
        }

        match provider.decide(finding) {
            Ok(Decision::Confirm) => true,
            Ok(Decision::Decline) => false,
            Ok(Decision::Always) => {
                debug!("Always-apply enabled for {}", self.policy);
                self.state = ConfirmState::AlwaysApply;
                true
            }
            Err(e) => {
                warn!(
                    "No decision for {}, leaving it unchanged: {}",
                    finding.path.display(),
                    e
                );
                false
            }
        }
    }
}

/// Replays a fixed list of decisions and records which findings were asked
/// about. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    script: VecDeque<Decision>,
    asked: Vec<PathBuf>,
}

impl ScriptedDecisions {
    pub fn new(script: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            script: script.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[PathBuf] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn decide(&mut self, finding: &Finding) -> io::Result<Decision> {
        self.asked.push(finding.path.clone());
        self.script.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "decision script exhausted")
        })
    }
}

/// Declines everything (`--dry-run`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclineAll;

impl DecisionProvider for DeclineAll {
    fn decide(&mut self, _finding: &Finding) -> io::Result<Decision> {
        Ok(Decision::Decline)
    }
}
