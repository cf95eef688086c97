mod cli;
mod logging;
mod prompt;
mod reporter;

use std::process;

use clap::{CommandFactory, Parser};
use clean_files::config::load_configuration;
use clean_files::confirm::{DeclineAll, DecisionProvider};
use clean_files::scanner::PathScanner;
use clean_files::{report, CleanEngine, RunSummary};
use cli::{CleanArgs, Cli, Commands};
use colored::*;
use dotenv::dotenv;
use prompt::TerminalPrompt;
use reporter::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    match args.command {
        Some(Commands::Clean(clean)) => run_clean(clean)?,
        Some(Commands::PrintConfig { config }) => {
            let config = match load_configuration(config.as_deref()) {
                Ok(config) => config,
                Err(err) => {
                    error!("Error loading configuration: {}", err);
                    process::exit(1);
                }
            };
            print!("{}", toml::to_string_pretty(&config)?);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_clean(args: CleanArgs) -> anyhow::Result<()> {
    let config = match load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let scanner = PathScanner::new(&args.directories, &config.ignore_patterns);
    let engine = CleanEngine::new(config).with_assume_yes(args.yes);
    let reporter = CliReporter::new();

    let mut decisions: Box<dyn DecisionProvider> = if args.dry_run {
        info!("Dry run: nothing will be changed");
        Box::new(DeclineAll)
    } else {
        Box::new(TerminalPrompt::new())
    };

    let summary = engine.run(
        &args.mode.policies(),
        &scanner,
        decisions.as_mut(),
        &reporter,
    );
    print_summary(&summary);

    if let Some(path) = &args.report {
        let rows = report::write_csv(path, &summary)?;
        println!("Report: {} rows written to {}", rows, path.display());
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Summary".bold());
    for report in &summary.policies {
        if let Some(reason) = &report.disabled {
            println!("  {:<8} {}", report.policy.name(), format!("skipped ({})", reason).red());
            continue;
        }
        println!(
            "  {:<8} {} found, {} applied, {} declined, {}",
            report.policy.name(),
            report.findings(),
            format!("{}", report.applied()).green(),
            report.declined(),
            if report.failed() > 0 {
                format!("{} failed", report.failed()).red()
            } else {
                "0 failed".normal()
            }
        );
    }
}
