use crate::config::Config;
use crate::model::Process;
use crate::parser;
use crate::report;
use crate::result::RuleCheckResult;
use crate::rules::diagnostics::DiagnosticsChecker;
use crate::rules::framework::FrameworkChecker;
use crate::rules::quality::CodeQualityChecker;
use crate::rules::RuleChecker;
use crate::utils;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Everything one analysis run produces: the findings, the parsed process
/// they refer to, and where the CSV report landed.
pub struct Analysis {
    pub results: Vec<RuleCheckResult>,
    pub process: Process,
    pub report_path: PathBuf,
}

/// Runs every rule checker against a parsed bot definition.
///
/// Checker order is fixed (Diagnostics, Framework, Code Quality) so results
/// and reports come out in a stable category order.
pub struct BotAnalyzer {
    checkers: Vec<Box<dyn RuleChecker>>,
}

impl BotAnalyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            checkers: vec![
                Box::new(DiagnosticsChecker::new(config.diagnostics.clone())),
                Box::new(FrameworkChecker::new(config.framework.clone())),
                Box::new(CodeQualityChecker::new(config.code_quality.clone())),
            ],
        }
    }

    /// Parses the bot file and collects findings from every checker.
    pub fn analyze_file(&self, path: &Path) -> Result<(Vec<RuleCheckResult>, Process)> {
        let process = parser::parse_bot_file(path)?;
        let mut results = Vec::new();
        for checker in &self.checkers {
            results.extend(checker.check_rules(&process));
        }
        Ok((results, process))
    }

    /// Full pipeline: parse, check, write the CSV report.
    ///
    /// When no output path is given the report lands next to the input as
    /// `<stem>_analysis.csv`; an explicit path is coerced to `.csv`.
    pub fn perform_analysis(&self, input: &Path, output: Option<&Path>) -> Result<Analysis> {
        let report_path = match output {
            Some(path) => utils::ensure_csv_extension(path),
            None => utils::default_output_path(input),
        };

        let (results, process) = self.analyze_file(input)?;
        report::write_results_csv(&results, &report_path)?;

        Ok(Analysis {
            results,
            process,
            report_path,
        })
    }
}
