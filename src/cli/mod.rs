//! Command-line parsing for the conjoint pricing tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation/simulation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cj", version, about = "Conjoint analysis and price optimization")]
pub struct Cli {
    /// Log level for this crate (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate part-worths per respondent, derive importance and WTP, and
    /// sweep the focal product's price against the competitors.
    Analyze(AnalyzeArgs),
    /// Write a synthetic survey CSV (useful for demos and smoke tests).
    Sample(SampleArgs),
    /// Print the default study configuration as JSON.
    Config,
}

/// Options for `cj analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Survey CSV: indicator columns plus one preference column per respondent.
    #[arg(long, value_name = "CSV")]
    pub survey: PathBuf,

    /// Study config JSON (see `cj config`). Defaults apply when omitted.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Override the preference column marker from the config.
    #[arg(long)]
    pub marker: Option<String>,

    /// Export per-respondent results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full report (config, results, summary) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Render an ASCII plot of the aggregate profit curve.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `cj sample`.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of synthetic respondents.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub respondents: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_exports() {
        let cli = Cli::parse_from([
            "cj",
            "analyze",
            "--survey",
            "s.csv",
            "--export",
            "r.csv",
            "--plot",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.survey, PathBuf::from("s.csv"));
                assert_eq!(args.export, Some(PathBuf::from("r.csv")));
                assert!(args.plot);
                assert!(args.config.is_none());
                assert_eq!(args.width, 80);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sample_requires_out() {
        assert!(Cli::try_parse_from(["cj", "sample"]).is_err());
        let cli = Cli::parse_from(["cj", "sample", "-n", "3", "--out", "x.csv"]);
        assert!(matches!(cli.command, Command::Sample(SampleArgs { respondents: 3, seed: 42, .. })));
    }
}
