use thiserror::Error;

/// Run-level failures. Everything scoped to a single file is reported through
/// [`ReadFailure`](crate::hasher::ReadFailure) or
/// [`ActionError`](crate::action::ActionError) instead and never ends up here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}
