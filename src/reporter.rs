use clean_files::action::Outcome;
use clean_files::engine::{PolicyReport, Resolution, ResolvedFinding};
use clean_files::policy::Policy;
use clean_files::ProgressReporter;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (unknown total files upfront)
/// - Hash phase: progress bar (total candidates known from the prefix pass)
/// - Resolution: one colored line per finding
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars(TICK_CHARS));
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_policy_start(&self, policy: Policy) {
        eprintln!(
            "\n{} {}",
            "==>".cyan().bold(),
            format!("Checking for {}", policy.description()).bold()
        );
        self.set_bar(spinner("Scanning files...".to_string()));
    }

    fn on_scan_progress(&self, files_found: usize) {
        self.with_bar(|pb| pb.set_message(format!("Scanning... {} files found", files_found)));
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} files in {:.2}s",
            "✓".green(),
            total_files,
            duration_secs
        );
    }

    fn on_hash_start(&self, total_files: usize) {
        let pb = ProgressBar::new(total_files as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Hashing [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_hash_progress(&self, files_hashed: usize, _total_files: usize) {
        self.with_bar(|pb| pb.set_position(files_hashed as u64));
    }

    fn on_hash_complete(&self, groups: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Hash complete: {} duplicate groups in {:.2}s",
            "✓".green(),
            groups,
            duration_secs
        );
    }

    fn on_policy_disabled(&self, policy: Policy, reason: &str) {
        self.finish_bar();
        eprintln!("  {} {} skipped: {}", "✗".red(), policy, reason);
    }

    fn on_resolved(&self, resolved: &ResolvedFinding) {
        if !resolved.prompted {
            println!("\n{}", resolved.finding);
        }
        let path = resolved.finding.path.display();
        match &resolved.resolution {
            Resolution::Applied(Outcome::Deleted) => println!("{} {}", "Deleted:".green(), path),
            Resolution::Applied(Outcome::ModeChanged { to, .. }) => println!(
                "{} {} ({})",
                "Permissions changed:".green(),
                path,
                to.octal()
            ),
            Resolution::Applied(Outcome::Renamed { to }) => {
                println!("{} {}", "Renamed to:".green(), to.display())
            }
            Resolution::Declined => println!("{} {}", "Left unchanged:".dimmed(), path),
            Resolution::Failed(e) if e.is_collision() => {
                println!("{} {}", "Name conflict:".yellow(), e)
            }
            Resolution::Failed(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    fn on_policy_complete(&self, report: &PolicyReport) {
        self.finish_bar();
        if report.disabled.is_none() && report.findings() == 0 {
            eprintln!("  Nothing to do");
        }
    }
}
