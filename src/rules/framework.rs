use crate::config::ConfigReader;
use crate::model::Process;
use crate::result::{Rule, RuleCheckResult, RuleCheckStatus};
use crate::rules::RuleChecker;
use regex::Regex;

const CATEGORY: &str = "Framework";

type Evaluator = fn(&FrameworkChecker, &Process, Rule) -> Vec<RuleCheckResult>;

const RULES: &[(&str, Evaluator)] = &[
    ("StartupActivity", FrameworkChecker::check_startup_activity),
    ("FrameworkActivities", FrameworkChecker::check_framework_activities),
    ("ActivityNamingConvention", FrameworkChecker::check_activity_naming),
    ("GlobalVariableNamingConvention", FrameworkChecker::check_global_variable_naming),
    ("ActivityVariableNamingConvention", FrameworkChecker::check_activity_variable_naming),
    ("GlobalVariablePlacement", FrameworkChecker::check_global_variable_placement),
    ("ExecutableComponentCount", FrameworkChecker::check_executable_component_count),
    ("ConnectorGrouping", FrameworkChecker::check_connector_grouping),
    ("QueueUtilization", FrameworkChecker::check_queue_utilization),
    ("PickWorkitem", FrameworkChecker::check_pick_workitem),
    ("UpdateWorkitem", FrameworkChecker::check_update_workitem),
];

lazy_static::lazy_static! {
    /// Built-in fallbacks used when a configured naming pattern does not
    /// compile. Note the dash sits last in the class: the configured
    /// default string keeps the legacy `\s-_` spelling, which this regex
    /// engine rejects as a range, so it lands here.
    static ref ACTIVITY_NAMING_DEFAULT: Regex =
        Regex::new(r"^[a-zA-Z0-9\s_-]*$").expect("valid built-in pattern");
    static ref VARIABLE_NAMING_DEFAULT: Regex =
        Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid built-in pattern");
}

const ACTIVITY_NAMING_PATTERN: &str = r"^[a-zA-Z0-9\s-_]*$";
const VARIABLE_NAMING_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Process-level structural and naming rules: required framework
/// activities, startup wiring, naming conventions, folder placement and
/// component budgets.
pub struct FrameworkChecker {
    config: ConfigReader,
}

impl FrameworkChecker {
    pub fn new(config: ConfigReader) -> Self {
        Self { config }
    }

    fn failing_status(&self, rule_key: &str, default: &str) -> RuleCheckStatus {
        let severity = self.config.get_string(rule_key, "Severity", default);
        RuleCheckStatus::from_severity(&severity)
    }

    fn check_startup_activity(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let expected_name = self.config.get_string("StartupActivity", "ExpectedName", "Main");
        let expected_path = self.config.get_string("StartupActivity", "ExpectedPath", "Activities");
        let status = self.failing_status("StartupActivity", "Fail");

        let startup_exists = process.activities.iter().any(|activity| {
            activity.root_path == expected_path
                && activity.name == expected_name
                && process.startup_activity_id == activity.id
        });

        let (status, comments) = if startup_exists {
            (
                RuleCheckStatus::Pass,
                format!("{expected_name} activity is present at the root level and is startup activity."),
            )
        } else {
            (
                status,
                "Main activity should be present at the root level and marked as startup activity."
                    .to_string(),
            )
        };

        vec![RuleCheckResult {
            rule,
            status,
            source: expected_path,
            comments,
        }]
    }

    fn check_framework_activities(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let required = self.config.get_string_array(
            "FrameworkActivities",
            "RequiredActivities",
            &["Initialize Workflow", "Get Workitem", "Process Workitem", "Exit Workflow"],
        );
        let base_path =
            self.config
                .get_string("FrameworkActivities", "BasePath", "Activities/Framework");
        let status = self.failing_status("FrameworkActivities", "Fail");

        let mut results = Vec::new();
        for activity_name in &required {
            let activity_path = format!("{base_path}/{activity_name}");
            let exists = process.activities.iter().any(|activity| {
                activity.name == *activity_name
                    && normalize_path(&activity.root_path) == normalize_path(&base_path)
            });
            results.push(RuleCheckResult {
                rule: rule.clone(),
                status: if exists { RuleCheckStatus::Pass } else { status },
                source: activity_path.clone(),
                comments: if exists {
                    format!("Activity '{activity_path}' is present.")
                } else {
                    format!("Activity '{activity_path}' is missing.")
                },
            });
        }
        results
    }

    fn check_activity_naming(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ActivityNamingConvention", "Warn");
        let min_length =
            self.config.get_int("ActivityNamingConvention", "MinLength", 3) as usize;
        let pattern = self.config.get_string(
            "ActivityNamingConvention",
            "NamingRegex",
            ACTIVITY_NAMING_PATTERN,
        );
        let regex = compile_or_fallback(&pattern, &ACTIVITY_NAMING_DEFAULT);

        process
            .activities
            .iter()
            .map(|activity| {
                let valid = validate_name(&activity.name, &regex, min_length);
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: activity.source_path(),
                    comments: naming_comment("activity", &activity.name, valid, &pattern, min_length),
                }
            })
            .collect()
    }

    fn check_global_variable_naming(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("GlobalVariableNamingConvention", "Warn");
        let min_length =
            self.config.get_int("GlobalVariableNamingConvention", "MinLength", 3) as usize;
        let pattern = self.config.get_string(
            "GlobalVariableNamingConvention",
            "NamingRegex",
            VARIABLE_NAMING_PATTERN,
        );
        let regex = compile_or_fallback(&pattern, &VARIABLE_NAMING_DEFAULT);

        process
            .variables
            .iter()
            .filter(|variable| variable.is_plain_variable())
            .map(|variable| {
                let valid = validate_name(&variable.name, &regex, min_length);
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: format!("{}/{}", variable.root_path, variable.name),
                    comments: naming_comment(
                        "global variable",
                        &variable.name,
                        valid,
                        &pattern,
                        min_length,
                    ),
                }
            })
            .collect()
    }

    fn check_activity_variable_naming(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ActivityVariableNamingConvention", "Warn");
        let min_length =
            self.config.get_int("ActivityVariableNamingConvention", "MinLength", 3) as usize;
        let pattern = self.config.get_string(
            "ActivityVariableNamingConvention",
            "NamingRegex",
            VARIABLE_NAMING_PATTERN,
        );
        let regex = compile_or_fallback(&pattern, &VARIABLE_NAMING_DEFAULT);

        let mut results = Vec::new();
        for activity in &process.activities {
            for variable in &activity.variables {
                let valid = validate_name(&variable.name, &regex, min_length);
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: format!("{}/{}", variable.root_path, variable.name),
                    comments: naming_comment(
                        "activity variable",
                        &variable.name,
                        valid,
                        &pattern,
                        min_length,
                    ),
                });
            }
        }
        results
    }

    fn check_global_variable_placement(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("GlobalVariablePlacement", "Warn");
        let expected_path = self.config.get_string(
            "GlobalVariablePlacement",
            "ExpectedPath",
            "Global Objects/Variables",
        );

        process
            .variables
            .iter()
            .filter(|variable| variable.is_plain_variable())
            .map(|variable| {
                let valid = path_is_under(&variable.root_path, &expected_path);
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: format!("{}/{}", variable.root_path, variable.name),
                    comments: if valid {
                        format!("The global variable '{}' is placed under the correct folder.", variable.name)
                    } else {
                        format!(
                            "The global variable '{}' should be placed under '{expected_path}' or its subfolders.",
                            variable.name
                        )
                    },
                }
            })
            .collect()
    }

    fn check_executable_component_count(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ExecutableComponentCount", "Fail");
        let max_count = self.config.get_int("ExecutableComponentCount", "MaxCount", 30) as usize;

        process
            .activities
            .iter()
            .map(|activity| {
                let count = activity.executable_items().count();
                let valid = count <= max_count;
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: activity.source_path(),
                    comments: if valid {
                        format!(
                            "The activity '{}' has {count} executable components, which is within the limit.",
                            activity.name
                        )
                    } else {
                        format!(
                            "The activity '{}' has {count} executable components, exceeding the limit of {max_count}.",
                            activity.name
                        )
                    },
                }
            })
            .collect()
    }

    fn check_connector_grouping(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ConnectorGrouping", "Warn");
        let expected_path = self.config.get_string(
            "ConnectorGrouping",
            "ExpectedPath",
            "Global Objects/{ConnectorType}",
        );

        process
            .variables
            .iter()
            .filter(|variable| !variable.is_plain_variable())
            .map(|variable| {
                let connector_path =
                    expected_path.replace("{ConnectorType}", &variable.connector_category());
                let valid = path_is_under(&variable.root_path, &connector_path);
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if valid { RuleCheckStatus::Pass } else { status },
                    source: format!("{}/{}", variable.root_path, variable.name),
                    comments: if valid {
                        format!("The connector '{}' is grouped under the correct folder.", variable.name)
                    } else {
                        format!(
                            "The connector '{}' should be grouped under '{connector_path}' or its subfolders.",
                            variable.name
                        )
                    },
                }
            })
            .collect()
    }

    fn check_queue_utilization(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("QueueUtilization", "Fail");
        let expected_type = self.config.get_string(
            "QueueUtilization",
            "ExpectedType",
            "UTL.RPA.CONNECTORS.AutxQueue",
        );

        let queue = process.variables.iter().find(|v| v.data_type == expected_type);
        let (status, comments) = match queue {
            Some(connector) => (
                RuleCheckStatus::Pass,
                format!("Queue connector {} found for transaction tracking.", connector.name),
            ),
            None => (status, "No queue connector found for transaction tracking.".to_string()),
        };

        vec![RuleCheckResult {
            rule,
            status,
            source: "Global Objects".to_string(),
            comments,
        }]
    }

    fn check_pick_workitem(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("PickWorkitem", "Warn");
        let expected_name = self.config.get_string("PickWorkitem", "ExpectedName", "PickWorkitem");
        self.check_workitem_action(process, rule, status, &expected_name, "Get Workitem")
    }

    fn check_update_workitem(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("UpdateWorkitem", "Fail");
        let expected_name =
            self.config.get_string("UpdateWorkitem", "ExpectedName", "UpdateWorkitem");
        self.check_workitem_action(process, rule, status, &expected_name, "Process Workitem")
    }

    /// A specific named action must exist inside a specific framework
    /// activity; a missing activity is itself the finding.
    fn check_workitem_action(
        &self,
        process: &Process,
        rule: Rule,
        status: RuleCheckStatus,
        expected_name: &str,
        activity_name: &str,
    ) -> Vec<RuleCheckResult> {
        let activity = process.activities.iter().find(|activity| {
            activity.name == activity_name && activity.root_path == "Activities/Framework"
        });

        let Some(activity) = activity else {
            return vec![RuleCheckResult {
                rule,
                status,
                source: "Activities".to_string(),
                comments: format!("'Activities/Framework/{activity_name}' activity is missing."),
            }];
        };

        let action_exists = activity.executable_items().any(|item| item.name == expected_name);
        vec![RuleCheckResult {
            rule,
            status: if action_exists { RuleCheckStatus::Pass } else { status },
            source: activity.source_path(),
            comments: if action_exists {
                format!("'{expected_name}' action is used in the '{activity_name}' activity.")
            } else {
                format!("'{expected_name}' action is missing in the '{activity_name}' activity.")
            },
        }]
    }
}

impl RuleChecker for FrameworkChecker {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn check_rules(&self, process: &Process) -> Vec<RuleCheckResult> {
        let mut results = Vec::new();
        for (rule_key, evaluator) in RULES {
            if !self.config.get_bool(rule_key, "Enabled", true) {
                continue;
            }
            let rule = Rule {
                category: CATEGORY.to_string(),
                name: self.config.get_string(rule_key, "Name", rule_key),
                description: self.config.get_string(rule_key, "Description", ""),
            };
            results.extend(evaluator(self, process, rule));
        }
        results
    }
}

fn compile_or_fallback(pattern: &str, fallback: &Regex) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| fallback.clone())
}

/// Configured regex plus minimum length plus the repeated-character check:
/// a run of three or more identical consecutive characters fails.
fn validate_name(name: &str, regex: &Regex, min_length: usize) -> bool {
    regex.is_match(name) && name.len() >= min_length && !has_repeated_run(name)
}

fn has_repeated_run(name: &str) -> bool {
    let mut run = 0;
    let mut previous = None;
    for ch in name.chars() {
        if Some(ch) == previous {
            run += 1;
            if run >= 3 {
                return true;
            }
        } else {
            previous = Some(ch);
            run = 1;
        }
    }
    false
}

fn naming_comment(kind: &str, name: &str, valid: bool, pattern: &str, min_length: usize) -> String {
    if valid {
        format!("The {kind} '{name}' follows the naming convention and length requirements.")
    } else {
        format!(
            "The {kind} '{name}' does not meet the naming requirements. It should match the pattern '{pattern}', have a minimum length of {min_length} characters and avoid repeated character runs."
        )
    }
}

/// Case-insensitive "equals or lives in a subfolder of" over slash
/// delimited logical paths.
fn path_is_under(path: &str, expected: &str) -> bool {
    let path = normalize_path(path).to_lowercase();
    let expected = normalize_path(expected).to_lowercase();
    path == expected || path.starts_with(&format!("{expected}/"))
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_run_detection() {
        assert!(has_repeated_run("Loooad Data"));
        assert!(!has_repeated_run("Load Data"));
        assert!(!has_repeated_run("aabb"));
        assert!(has_repeated_run("aaab"));
    }

    #[test]
    fn test_path_is_under() {
        assert!(path_is_under("Global Objects/Variables", "Global Objects/Variables"));
        assert!(path_is_under("Global Objects/Variables/Sub", "Global Objects/Variables"));
        assert!(path_is_under("global objects/variables", "Global Objects/Variables"));
        assert!(!path_is_under("Global Objects/Queue", "Global Objects/Variables"));
    }
}
