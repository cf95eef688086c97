mod evaluators;
mod mode;

pub use evaluators::{
    sanitize_name, sanitize_os_name, AttributePolicy, EmptyPolicy, Evaluator, RenameConfigError,
    RenamePolicy, TempPolicy,
};
pub use mode::{ModeParseError, PermissionMode};

use clap::ValueEnum;
use std::fmt;

/// One of the six independent cleanup rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    Empty,
    Temp,
    Duplicates,
    SameName,
    Attributes,
    Rename,
}

impl Policy {
    /// The order used when every policy runs.
    pub const ALL: [Policy; 6] = [
        Policy::Empty,
        Policy::Temp,
        Policy::Duplicates,
        Policy::SameName,
        Policy::Attributes,
        Policy::Rename,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Policy::Empty => "empty",
            Policy::Temp => "temp",
            Policy::Duplicates => "dups",
            Policy::SameName => "same",
            Policy::Attributes => "attrib",
            Policy::Rename => "rename",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Policy::Empty => "empty files",
            Policy::Temp => "temporary files",
            Policy::Duplicates => "duplicate content",
            Policy::SameName => "same-named files",
            Policy::Attributes => "permission mismatches",
            Policy::Rename => "problematic file names",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Policy selector accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    Empty,
    Temp,
    Dups,
    Same,
    Attrib,
    Rename,
    #[default]
    All,
}

impl Mode {
    pub fn policies(self) -> Vec<Policy> {
        match self {
            Mode::Empty => vec![Policy::Empty],
            Mode::Temp => vec![Policy::Temp],
            Mode::Dups => vec![Policy::Duplicates],
            Mode::Same => vec![Policy::SameName],
            Mode::Attrib => vec![Policy::Attributes],
            Mode::Rename => vec![Policy::Rename],
            Mode::All => Policy::ALL.to_vec(),
        }
    }
}
