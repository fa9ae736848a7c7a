use serde::Serialize;
use std::fmt;

/// Descriptor for one compliance rule, as it appears in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub category: String,
    pub name: String,
    pub description: String,
}

/// Outcome of one rule evaluation. Pass is never configurable; the failing
/// status comes from the rule's `Severity` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleCheckStatus {
    Pass,
    Warn,
    Fail,
}

impl RuleCheckStatus {
    /// Maps a configured severity string to the failing status.
    /// Case-insensitive; anything unrecognized downgrades to Warn.
    pub fn from_severity(severity: &str) -> RuleCheckStatus {
        match severity.to_lowercase().as_str() {
            "fail" => RuleCheckStatus::Fail,
            _ => RuleCheckStatus::Warn,
        }
    }
}

impl fmt::Display for RuleCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleCheckStatus::Pass => "Pass",
            RuleCheckStatus::Warn => "Warn",
            RuleCheckStatus::Fail => "Fail",
        };
        f.write_str(label)
    }
}

/// One row of the compliance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCheckResult {
    pub rule: Rule,
    pub status: RuleCheckStatus,
    /// Slash-joined logical path of the offending activity, screen or
    /// variable.
    pub source: String,
    /// Human-readable explanation. Stable for identical input.
    pub comments: String,
}

/// Aggregated counts for one rule category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl CategorySummary {
    pub fn total(&self) -> usize {
        self.pass + self.warn + self.fail
    }

    /// Category score in percent: a pass counts fully, a warning half.
    /// Exact; rounding happens only at display time.
    pub fn score(&self) -> f64 {
        (self.pass as f64 + self.warn as f64 * 0.5) / self.total() as f64 * 100.0
    }
}

/// Groups results by category, preserving first-seen category order.
pub fn summarize(results: &[RuleCheckResult]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();
    for result in results {
        let summary = match summaries
            .iter_mut()
            .find(|summary| summary.category == result.rule.category)
        {
            Some(summary) => summary,
            None => {
                summaries.push(CategorySummary {
                    category: result.rule.category.clone(),
                    pass: 0,
                    warn: 0,
                    fail: 0,
                });
                summaries.last_mut().expect("just pushed")
            }
        };
        match result.status {
            RuleCheckStatus::Pass => summary.pass += 1,
            RuleCheckStatus::Warn => summary.warn += 1,
            RuleCheckStatus::Fail => summary.fail += 1,
        }
    }
    summaries
}

/// Mean of the category scores.
pub fn overall_score(summaries: &[CategorySummary]) -> f64 {
    if summaries.is_empty() {
        return 0.0;
    }
    summaries.iter().map(CategorySummary::score).sum::<f64>() / summaries.len() as f64
}

/// Qualitative label for an overall score.
pub fn rating(overall: f64) -> &'static str {
    if overall >= 95.0 {
        "Excellent"
    } else if overall >= 85.0 {
        "Good"
    } else if overall >= 65.0 {
        "Fair"
    } else if overall >= 55.0 {
        "Needs Improvement"
    } else {
        "Poor"
    }
}
