//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the survey and study config
//! - runs the analysis pipeline
//! - prints the report and plot, and writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{AnalyzeArgs, Cli, Command, SampleArgs};
use crate::domain::StudyConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cj` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init_logging(&cli.log_level)?;

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Sample(args) => handle_sample(args),
        Command::Config => handle_config(),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let mut config = match &args.config {
        Some(path) => crate::io::load_config(path)?,
        None => StudyConfig::default(),
    };
    if let Some(marker) = &args.marker {
        config.preference_marker = marker.clone();
    }

    let table = crate::io::load_survey_csv(&args.survey, &config.preference_marker)?;
    let report = pipeline::analyze_study(&table, &config)?;

    println!("{}", crate::report::format_study_report(&report, &config));
    if args.plot {
        println!(
            "{}",
            crate::plot::render_profit_plot(&report.summary, args.width, args.height)
        );
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::write_results_csv(path, &report)?;
        info!(path = %path.display(), "wrote results CSV");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_report_json(path, &report, &config)?;
        info!(path = %path.display(), "wrote report JSON");
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let table = crate::data::generate_survey(args.respondents, args.seed)?;
    crate::io::write_survey_csv(&args.out, &table)?;
    println!(
        "Wrote {} profiles x {} respondents to {}",
        table.profiles.len(),
        table.preferences.len(),
        args.out.display()
    );
    Ok(())
}

fn handle_config() -> Result<(), AppError> {
    println!("{}", crate::io::config_to_json(&StudyConfig::default())?);
    Ok(())
}
