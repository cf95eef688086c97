use crate::action::Outcome;
use crate::engine::{Resolution, RunSummary};
use crate::error::Error;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    policy: &'a str,
    path: String,
    action: String,
    detail: String,
    prompted: bool,
    outcome: String,
}

fn outcome_label(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Applied(Outcome::Deleted) => "deleted".to_string(),
        Resolution::Applied(Outcome::ModeChanged { to, .. }) => format!("chmod {}", to.octal()),
        Resolution::Applied(Outcome::Renamed { to }) => format!("renamed to {}", to.display()),
        Resolution::Declined => "declined".to_string(),
        Resolution::Failed(e) if e.is_collision() => format!("collision: {}", e),
        Resolution::Failed(e) => format!("failed: {}", e),
    }
}

/// Write one CSV row per finding. Returns the number of rows written.
pub fn write_csv(path: &Path, summary: &RunSummary) -> Result<usize, Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for report in &summary.policies {
        for resolved in &report.resolved {
            wtr.serialize(ReportRow {
                policy: report.policy.name(),
                path: resolved.finding.path.display().to_string(),
                action: resolved.finding.action.to_string(),
                detail: resolved.finding.summary(),
                prompted: resolved.prompted,
                outcome: outcome_label(&resolved.resolution),
            })?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}
