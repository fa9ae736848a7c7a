use crate::config::ConfigReader;
use crate::model::{Activity, ExecutableItem, OnErrorAction, Process};
use crate::result::{Rule, RuleCheckResult, RuleCheckStatus};
use crate::rules::RuleChecker;
use uuid::Uuid;

const CATEGORY: &str = "Diagnostics";

type Evaluator = fn(&DiagnosticsChecker, &Activity, Rule) -> RuleCheckResult;

/// Registration order fixes the report order within the category.
const RULES: &[(&str, Evaluator)] = &[
    ("ActivityStartLog", DiagnosticsChecker::has_start_log),
    ("ActivityEndLog", DiagnosticsChecker::has_end_log),
    ("ExceptionLog", DiagnosticsChecker::has_exception_log),
    ("ActivityErrorHandling", DiagnosticsChecker::starts_with_error_handler),
    ("ErrorPortUtilization", DiagnosticsChecker::has_error_ports_used),
    ("NonEmptyLogs", DiagnosticsChecker::has_non_empty_logs),
    ("ComponentErrorHandlerComment", DiagnosticsChecker::has_component_error_handler_comment),
];

/// Per-activity diagnostic rules: every evaluator inspects the control,
/// data and comment graph of one activity and produces exactly one result,
/// short-circuiting on the first violation it finds.
pub struct DiagnosticsChecker {
    config: ConfigReader,
}

impl DiagnosticsChecker {
    pub fn new(config: ConfigReader) -> Self {
        Self { config }
    }

    fn failing_status(&self, rule_key: &str, default: &str) -> RuleCheckStatus {
        let severity = self.config.get_string(rule_key, "Severity", default);
        RuleCheckStatus::from_severity(&severity)
    }

    fn has_start_log(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let expected_message =
            self.config
                .get_string("ActivityStartLog", "ExpectedLogMessage", "{ActivityName} started");
        let status = self.failing_status("ActivityStartLog", "Warn");
        let allowed_levels =
            self.config
                .get_string_array("ActivityStartLog", "AllowedLogLevels", &["INFO", "DEBUG"]);
        let exact_match = self.config.get_bool("ActivityStartLog", "RequireExactMatch", false);
        let case_sensitive = self.config.get_bool("ActivityStartLog", "CaseSensitive", false);
        let expected = expected_message.replace("{ActivityName}", &activity.name);

        let entry_point = activity.executable_item_of_type("EntryPoint");
        let connection =
            activity.control_connection_with_source_port(control_out_id(entry_point));
        let Some(connection) = connection else {
            return result(&rule, activity, status, "Start node disconnected.");
        };

        let first_item = activity.executable_item_with_control_in_port(Some(connection.sink_port_id));
        if let Some(catch_error) = first_item.filter(|item| item.item_type == "CatchError") {
            let try_connection =
                activity.control_connection_with_source_port(control_out_id(Some(catch_error)));
            let Some(try_connection) = try_connection else {
                return result(&rule, activity, status, "Try port of Try-Catch node disconnected.");
            };
            let second_item =
                activity.executable_item_with_control_in_port(Some(try_connection.sink_port_id));
            if let Some(log_item) = second_item.filter(|item| is_log_writer(item)) {
                if !level_allowed(&allowed_levels, &log_item.log_mode) {
                    return result(
                        &rule,
                        activity,
                        status,
                        &format!(
                            "Activity starts with 'Try' block followed by Log but does not match allowed log levels: {}.",
                            allowed_levels.join(", ")
                        ),
                    );
                }
                if matches_expected_log_message(log_item, &expected, exact_match, case_sensitive) {
                    return result(
                        &rule,
                        activity,
                        RuleCheckStatus::Pass,
                        &format!(
                            "Activity starts with 'Try' block followed by Log: '{}'.",
                            log_item.log_message
                        ),
                    );
                }
            }
        }

        result(
            &rule,
            activity,
            status,
            &format!(
                "Activity should start with 'Try' block followed by Log containing: '{}' with allowed log levels: {}.",
                expected,
                allowed_levels.join(", ")
            ),
        )
    }

    fn has_end_log(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let expected_message =
            self.config
                .get_string("ActivityEndLog", "ExpectedLogMessage", "{ActivityName} completed");
        let status = self.failing_status("ActivityEndLog", "Warn");
        let allowed_levels =
            self.config
                .get_string_array("ActivityEndLog", "AllowedLogLevels", &["INFO", "DEBUG"]);
        let exact_match = self.config.get_bool("ActivityEndLog", "RequireExactMatch", false);
        let case_sensitive = self.config.get_bool("ActivityEndLog", "CaseSensitive", false);
        let expected = expected_message.replace("{ActivityName}", &activity.name);

        let exit_point = activity.executable_item_of_type("ExitPoint");
        let connections = activity.control_connections_with_sink_port(control_in_id(exit_point));

        if connections.is_empty() {
            return result(&rule, activity, status, "End node disconnected.");
        }

        for connection in connections {
            let feeding_item =
                activity.executable_item_with_control_out_port(Some(connection.source_port_id));
            let Some(item) = feeding_item else {
                return end_log_violation(&rule, activity, status, &expected, &allowed_levels);
            };
            if !is_log_writer(item)
                || !matches_expected_log_message(item, &expected, exact_match, case_sensitive)
                || !level_allowed(&allowed_levels, &item.log_mode)
            {
                return end_log_violation(&rule, activity, status, &expected, &allowed_levels);
            }
        }

        result(
            &rule,
            activity,
            RuleCheckStatus::Pass,
            &format!("Activity paths end with Log containing: '{expected}'."),
        )
    }

    fn has_exception_log(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let status = self.failing_status("ExceptionLog", "Fail");
        let allowed_levels = self.config.get_string_array(
            "ExceptionLog",
            "AllowedLogLevels",
            &["WARN", "ERROR", "EXCEPTION"],
        );

        let catch_items: Vec<&ExecutableItem> = activity
            .executable_items()
            .filter(|item| item.item_type == "CatchError")
            .collect();

        if catch_items.is_empty() {
            return result(&rule, activity, status, "No Try-Catch block found.");
        }

        for catch_item in catch_items {
            if catch_item.error_out_port_id.is_nil() {
                continue;
            }
            let connection =
                activity.control_connection_with_source_port(Some(catch_item.error_out_port_id));
            let Some(connection) = connection else {
                return result(&rule, activity, status, "'On Error' port of 'Try-Catch' not used");
            };
            let log_item =
                activity.executable_item_with_control_in_port(Some(connection.sink_port_id));
            let Some(log_item) = log_item.filter(|item| is_log_writer(item)) else {
                return result(
                    &rule,
                    activity,
                    status,
                    "Log message not used immediately after 'On Error' port of 'Try-Catch'",
                );
            };
            if !level_allowed(&allowed_levels, &log_item.log_mode) {
                return result(
                    &rule,
                    activity,
                    status,
                    &format!(
                        "Incorrect log mode: {} for exception log message. Allowed levels: {}",
                        log_item.log_mode,
                        allowed_levels.join(", ")
                    ),
                );
            }
        }

        result(
            &rule,
            activity,
            RuleCheckStatus::Pass,
            "Log used immediately after 'On Error' port of 'Try-Catch' with appropriate log level and content",
        )
    }

    fn starts_with_error_handler(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let status = self.failing_status("ActivityErrorHandling", "Fail");
        let entry_point = activity.executable_item_of_type("EntryPoint");
        let connection =
            activity.control_connection_with_source_port(control_out_id(entry_point));
        let Some(connection) = connection else {
            return result(&rule, activity, status, "Start node disconnected.");
        };

        let first_item = activity.executable_item_with_control_in_port(Some(connection.sink_port_id));
        if first_item.is_some_and(|item| item.item_type == "CatchError") {
            return result(
                &rule,
                activity,
                RuleCheckStatus::Pass,
                "Activity starts with 'Try-Catch' block.",
            );
        }

        result(&rule, activity, status, "Activity should start with 'Try-Catch' block.")
    }

    fn has_error_ports_used(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let status = self.failing_status("ErrorPortUtilization", "Fail");
        let require_message_mapping =
            self.config
                .get_bool("ErrorPortUtilization", "RequireErrorMessagePortMapping", true);

        let catch_items: Vec<&ExecutableItem> = activity
            .executable_items()
            .filter(|item| item.item_type == "CatchError")
            .collect();

        if catch_items.is_empty() {
            return result(&rule, activity, status, "No Try-Catch block found.");
        }

        for catch_item in catch_items {
            let connection =
                activity.control_connection_with_source_port(Some(catch_item.error_out_port_id));
            let Some(connection) = connection else {
                return result(
                    &rule,
                    activity,
                    status,
                    "'On Error' port of Try-Catch node disconnected",
                );
            };

            let connected_item =
                activity.executable_item_with_control_in_port(Some(connection.sink_port_id));
            if connected_item.is_none_or(|item| item.item_type == "ExitPoint") {
                return result(
                    &rule,
                    activity,
                    status,
                    "'On Error' port of Try-Catch node connected to invalid node",
                );
            }

            if require_message_mapping {
                // A mapped variable already captures the error message.
                if !catch_item.mapped_variables.is_empty() {
                    continue;
                }
                let data_connection = activity
                    .data_connection_with_source_port(Some(catch_item.error_message_port_id));
                if data_connection.is_none() {
                    return result(
                        &rule,
                        activity,
                        status,
                        "'Error Message' port of Try-Catch node disconnected",
                    );
                }
            }
        }

        result(
            &rule,
            activity,
            RuleCheckStatus::Pass,
            "On Error and Error Message port of Try-Catch nodes are used correctly",
        )
    }

    fn has_non_empty_logs(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let status = self.failing_status("NonEmptyLogs", "Warn");
        let min_length = self.config.get_int("NonEmptyLogs", "MinLogLength", 10) as usize;

        let log_items: Vec<&ExecutableItem> = activity
            .executable_items()
            .filter(|item| is_log_writer(item))
            .collect();

        if log_items.is_empty() {
            return result(&rule, activity, status, "No log message found.");
        }

        for log_item in log_items {
            if log_item.log_message.trim().is_empty() || log_item.log_message.len() < min_length {
                return result(
                    &rule,
                    activity,
                    status,
                    &format!("Log message is empty or too short (minimum length: {min_length})."),
                );
            }
        }

        result(&rule, activity, RuleCheckStatus::Pass, "Non-empty log messages used.")
    }

    fn has_component_error_handler_comment(&self, activity: &Activity, rule: Rule) -> RuleCheckResult {
        let status = self.failing_status("ComponentErrorHandlerComment", "Warn");

        for item in activity.executable_items() {
            if item.error_handling.on_error != OnErrorAction::Inherit
                || item.error_handling.on_error_after_retry != OnErrorAction::Inherit
            {
                let connection =
                    activity.comment_connection_with_source_port(Some(item.comment_port_id));
                if connection.is_none() {
                    let name = if item.name.is_empty() { &item.item_type } else { &item.name };
                    return result(
                        &rule,
                        activity,
                        status,
                        &format!(
                            "Component '{name}' has modified error handling property but lacks a comment."
                        ),
                    );
                }
            }
        }

        result(
            &rule,
            activity,
            RuleCheckStatus::Pass,
            "Components with modified error handling have appropriate comments.",
        )
    }
}

impl RuleChecker for DiagnosticsChecker {
    fn category(&self) -> &'static str {
        CATEGORY
    }

    fn check_rules(&self, process: &Process) -> Vec<RuleCheckResult> {
        let mut results = Vec::new();
        for activity in &process.activities {
            for (rule_key, evaluator) in RULES {
                if !self.config.get_bool(rule_key, "Enabled", true) {
                    continue;
                }
                let rule = Rule {
                    category: CATEGORY.to_string(),
                    name: self.config.get_string(rule_key, "Name", rule_key),
                    description: self.config.get_string(rule_key, "Description", ""),
                };
                results.push(evaluator(self, activity, rule));
            }
        }
        results
    }
}

fn result(rule: &Rule, activity: &Activity, status: RuleCheckStatus, comments: &str) -> RuleCheckResult {
    RuleCheckResult {
        rule: rule.clone(),
        status,
        source: activity.source_path(),
        comments: comments.to_string(),
    }
}

fn end_log_violation(
    rule: &Rule,
    activity: &Activity,
    status: RuleCheckStatus,
    expected: &str,
    allowed_levels: &[String],
) -> RuleCheckResult {
    result(
        rule,
        activity,
        status,
        &format!(
            "Activity paths should end with Log containing: '{}' with allowed log levels: {}.",
            expected,
            allowed_levels.join(", ")
        ),
    )
}

fn is_log_writer(item: &ExecutableItem) -> bool {
    item.item_type == "LogWriter"
}

fn level_allowed(allowed_levels: &[String], log_mode: &str) -> bool {
    allowed_levels.iter().any(|level| level.eq_ignore_ascii_case(log_mode))
}

fn matches_expected_log_message(
    item: &ExecutableItem,
    expected: &str,
    exact_match: bool,
    case_sensitive: bool,
) -> bool {
    let message = &item.log_message;
    if exact_match {
        return if case_sensitive {
            message == expected
        } else {
            message.eq_ignore_ascii_case(expected)
        };
    }
    if case_sensitive {
        message.contains(expected)
    } else {
        message.to_lowercase().contains(&expected.to_lowercase())
    }
}

fn control_out_id(item: Option<&ExecutableItem>) -> Option<Uuid> {
    item.and_then(|item| item.control_out.as_ref()).map(|port| port.id)
}

fn control_in_id(item: Option<&ExecutableItem>) -> Option<Uuid> {
    item.and_then(|item| item.control_in.as_ref()).map(|port| port.id)
}
