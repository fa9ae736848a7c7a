use botlint::analyzer::BotAnalyzer;
use botlint::config::Config;
use botlint::result::{self, RuleCheckStatus};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

const BOT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AutxProcess xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <ID>11111111-1111-1111-1111-111111111111</ID>
  <StartupActivityID>22222222-2222-2222-2222-222222222222</StartupActivityID>
  <Activities>
    <AutxActivity>
      <ID>22222222-2222-2222-2222-222222222222</ID>
      <Name>Main</Name>
      <RootPath>Activities</RootPath>
      <Items>
        <DesignItem xsi:type="EntryPoint">
          <ID>44444444-4444-4444-4444-444444444444</ID>
          <ControlOut>
            <ID>55555555-5555-5555-5555-555555555555</ID>
          </ControlOut>
        </DesignItem>
      </Items>
    </AutxActivity>
  </Activities>
  <Variables>
    <AutxObject xsi:type="UTL.RPA.CONNECTORS.AutxQueue">
      <ID>bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb</ID>
      <Name>WorkQueue</Name>
      <RootPath>Global Objects/Queue</RootPath>
    </AutxObject>
  </Variables>
</AutxProcess>
"#;

fn write_bot(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("demo.ibot");
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", BOT_XML).unwrap();
    path
}

#[test]
fn test_full_analysis_run() {
    let dir = tempdir().unwrap();
    let input = write_bot(dir.path());

    let analyzer = BotAnalyzer::new(&Config::default());
    let analysis = analyzer.perform_analysis(&input, None).unwrap();

    assert_eq!(analysis.report_path, dir.path().join("demo_analysis.csv"));
    assert!(analysis.report_path.exists(), "CSV report written next to the input");
    assert_eq!(analysis.process.activities.len(), 1);
    assert!(!analysis.results.is_empty());

    // Every category contributes results.
    let categories: Vec<&str> = {
        let mut seen = Vec::new();
        for result in &analysis.results {
            if !seen.contains(&result.rule.category.as_str()) {
                seen.push(result.rule.category.as_str());
            }
        }
        seen
    };
    assert_eq!(categories, vec!["Diagnostics", "Framework", "Code Quality"]);

    // The queue connector is present, so that framework check passes.
    let queue = analysis
        .results
        .iter()
        .find(|result| result.rule.name == "QueueUtilization")
        .unwrap();
    assert_eq!(queue.status, RuleCheckStatus::Pass);
}

#[test]
fn test_analysis_is_deterministic() {
    let dir = tempdir().unwrap();
    let input = write_bot(dir.path());

    let analyzer = BotAnalyzer::new(&Config::default());
    let first = analyzer.perform_analysis(&input, None).unwrap();
    let second = analyzer.perform_analysis(&input, None).unwrap();

    assert_eq!(first.results, second.results, "same input must yield identical findings");
}

#[test]
fn test_category_summaries_add_up() {
    let dir = tempdir().unwrap();
    let input = write_bot(dir.path());

    let analyzer = BotAnalyzer::new(&Config::default());
    let analysis = analyzer.perform_analysis(&input, None).unwrap();
    let summaries = result::summarize(&analysis.results);

    for summary in &summaries {
        let count = analysis
            .results
            .iter()
            .filter(|result| result.rule.category == summary.category)
            .count();
        assert_eq!(summary.total(), count, "summary counts for {}", summary.category);
        assert!(summary.score() >= 0.0 && summary.score() <= 100.0);
    }

    let overall = result::overall_score(&summaries);
    assert!(overall >= 0.0 && overall <= 100.0);
    assert!(!result::rating(overall).is_empty());
}

#[test]
fn test_explicit_output_path_forced_to_csv() {
    let dir = tempdir().unwrap();
    let input = write_bot(dir.path());
    let requested = dir.path().join("findings.txt");

    let analyzer = BotAnalyzer::new(&Config::default());
    let analysis = analyzer.perform_analysis(&input, Some(&requested)).unwrap();

    assert_eq!(analysis.report_path, dir.path().join("findings.csv"));
    let content = fs::read_to_string(&analysis.report_path).unwrap();
    assert!(content.starts_with("Category,Name,Status,Source,Comments,Description"));
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let analyzer = BotAnalyzer::new(&Config::default());
    let missing = dir.path().join("absent.ibot");
    assert!(analyzer.perform_analysis(&missing, None).is_err());
}

#[test]
fn test_config_load_requires_all_sections() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Diagnostics.json"), "{}").unwrap();
    fs::write(dir.path().join("Framework.json"), "{}").unwrap();
    // CodeQuality.json missing.
    assert!(Config::load(dir.path()).is_err());

    fs::write(dir.path().join("CodeQuality.json"), "{}").unwrap();
    assert!(Config::load(dir.path()).is_ok());
}
