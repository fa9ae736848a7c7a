use crate::result::RuleCheckResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const COLUMNS: [&str; 6] = ["Category", "Name", "Status", "Source", "Comments", "Description"];

/// Writes the flat findings table as CSV, one row per rule check result.
pub fn write_results_csv(results: &[RuleCheckResult], path: &Path) -> Result<()> {
    let mut out = String::new();
    out.push_str(&COLUMNS.map(escape_csv_field).join(","));
    out.push('\n');

    for result in results {
        let fields = [
            result.rule.category.as_str(),
            result.rule.name.as_str(),
            &result.status.to_string(),
            result.source.as_str(),
            result.comments.as_str(),
            result.rule.description.as_str(),
        ];
        out.push_str(&fields.map(escape_csv_field).join(","));
        out.push('\n');
    }

    fs::write(path, out)
        .with_context(|| format!("failed to write report: {}", path.display()))
}

/// RFC 4180 quoting: fields containing a comma, quote or line break are
/// wrapped in quotes with inner quotes doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
