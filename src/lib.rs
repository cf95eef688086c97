pub mod action;
pub mod analysis;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod finding;
pub mod hasher;
pub mod platform;
pub mod policy;
pub mod progress;
pub mod record;
pub mod report;
pub mod scanner;

pub use config::AppConfig;
pub use engine::{CleanEngine, PolicyReport, RunSummary};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
