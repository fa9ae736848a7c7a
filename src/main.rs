use anyhow::{bail, Result};
use botlint::analyzer::BotAnalyzer;
use botlint::config::Config;
use botlint::result::{self, RuleCheckStatus};
use botlint::utils;
use clap::Parser;
use colored::*;
use serde_json::json;
use std::path::PathBuf;

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the serialized bot definition (.ibot) to analyze.
    input: PathBuf,

    /// Where to write the CSV report.
    /// Defaults to `<input stem>_analysis.csv` next to the input file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding Diagnostics.json, Framework.json and
    /// CodeQuality.json. Without it every rule runs with built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output raw JSON instead of the human-readable summary.
    /// This is useful for integrating with other tools or CI/CD pipelines.
    #[arg(long)]
    json: bool,
}

/// Main entry point of the application.
///
/// This function handles argument parsing, configuration loading,
/// execution of the analysis, and output formatting.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Users drag files in from shells and file managers, which wrap the
    // path in quotes.
    let input = PathBuf::from(utils::sanitize_path(&cli.input.to_string_lossy()));
    if !utils::is_bot_file(&input) {
        bail!("not a bot definition file (.ibot): {}", input.display());
    }

    // A missing --config means built-in defaults; a --config that fails to
    // load is a hard error rather than a silent fallback.
    let config = match &cli.config {
        Some(dir) => Config::load(dir)?,
        None => Config::default(),
    };

    if !cli.json {
        println!("Analyzing bot: {}", input.display());
    }

    let analyzer = BotAnalyzer::new(&config);
    let analysis = analyzer.perform_analysis(&input, cli.output.as_deref())?;

    let summaries = result::summarize(&analysis.results);
    let overall = result::overall_score(&summaries);

    if cli.json {
        // Machine output carries the raw findings plus the derived scores.
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "results": analysis.results,
                "categories": summaries
                    .iter()
                    .map(|summary| json!({
                        "category": summary.category,
                        "pass": summary.pass,
                        "warn": summary.warn,
                        "fail": summary.fail,
                        "score": summary.score(),
                    }))
                    .collect::<Vec<_>>(),
                "overall_score": overall,
                "rating": result::rating(overall),
                "report": analysis.report_path,
            }))?
        );
    } else {
        println!("\n{}", "Bot Compliance Analysis Results".bold());
        println!("===================================\n");

        for summary in &summaries {
            println!(
                "{}: {} pass / {} warn / {} fail ({:.1}%)",
                summary.category.bold(),
                summary.pass.to_string().green(),
                summary.warn.to_string().yellow(),
                summary.fail.to_string().red(),
                summary.score()
            );
        }

        let failures: Vec<_> = analysis
            .results
            .iter()
            .filter(|result| result.status == RuleCheckStatus::Fail)
            .collect();
        if !failures.is_empty() {
            println!("\n - Failed Checks");
            println!("================");
            for (i, finding) in failures.iter().enumerate() {
                println!(" {}. {} [{}]", i + 1, finding.comments, finding.rule.name);
                println!("    └─ {}", finding.source);
            }
        }

        println!(
            "\nOverall score: {:.1}% ({})",
            overall,
            result::rating(overall).bold()
        );
        println!("Report written to {}", analysis.report_path.display());
    }

    Ok(())
}
