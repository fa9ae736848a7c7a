use crate::config::ConfigReader;
use crate::model::Process;
use crate::result::{Rule, RuleCheckResult, RuleCheckStatus};
use crate::rules::RuleChecker;
use crate::screens::{short_rule_type, MatchRuleKind, Screen};
use regex::Regex;
use uuid::Uuid;

const CATEGORY: &str = "Code Quality";

type Evaluator = fn(&CodeQualityChecker, &Process, Rule) -> Vec<RuleCheckResult>;

const RULES: &[(&str, Evaluator)] = &[
    ("OpenCloseMethodPair", CodeQualityChecker::check_open_close_connector_methods),
    ("HardcodedDelay", CodeQualityChecker::check_hardcoded_delays),
    ("ModifiedDelayProperties", CodeQualityChecker::check_modified_delay_properties),
    ("Comments", CodeQualityChecker::check_non_empty_comments),
    ("WindowsScreenRules", CodeQualityChecker::check_windows_screen_rules),
    ("WindowsElementRules", CodeQualityChecker::check_windows_element_rules),
    ("ChromeScreenRules", CodeQualityChecker::check_chrome_screen_rules),
    ("ChromeElementRules", CodeQualityChecker::check_chrome_element_rules),
    ("DataTransformUsage", CodeQualityChecker::check_data_transform_usage),
];

lazy_static::lazy_static! {
    static ref HAS_DIGIT: Regex = Regex::new(r"\d").expect("valid built-in pattern");
}

/// Code-quality rules over connectors, delays, comments, UI screens and
/// data transforms.
pub struct CodeQualityChecker {
    config: ConfigReader,
}

impl CodeQualityChecker {
    pub fn new(config: ConfigReader) -> Self {
        Self { config }
    }

    fn failing_status(&self, rule_key: &str, default: &str) -> RuleCheckStatus {
        let severity = self.config.get_string(rule_key, "Severity", default);
        RuleCheckStatus::from_severity(&severity)
    }

    /// Every "open"-prefixed connector method call must have a matching
    /// "close"-prefixed call on the same target object within the same
    /// activity, and vice versa.
    fn check_open_close_connector_methods(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("OpenCloseMethodPair", "Warn");
        let open_prefixes = self.config.get_string_array(
            "OpenCloseMethodPair",
            "OpenMethodPrefixes",
            &["Open", "Load", "SetAccount"],
        );
        let close_prefixes =
            self.config
                .get_string_array("OpenCloseMethodPair", "CloseMethodPrefixes", &["Close"]);

        let connector_info = |object_id: Uuid| -> String {
            match process.variables.iter().find(|v| v.id == object_id) {
                Some(connector) => format!("{}/{}", connector.root_path, connector.name),
                None => format!("Unknown connector (ID: {object_id})"),
            }
        };

        let mut results = Vec::new();
        for activity in &process.activities {
            let open_methods: Vec<_> = activity
                .executable_items()
                .filter(|item| {
                    item.item_type == "AutxMethod" && starts_with_any(&item.method_name, &open_prefixes)
                })
                .collect();
            let close_methods: Vec<_> = activity
                .executable_items()
                .filter(|item| {
                    item.item_type == "AutxMethod" && starts_with_any(&item.method_name, &close_prefixes)
                })
                .collect();

            for open_method in &open_methods {
                let info = connector_info(open_method.object_id);
                let has_close = close_methods.iter().any(|item| item.object_id == open_method.object_id);
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: if has_close { RuleCheckStatus::Pass } else { status },
                    source: activity.source_path(),
                    comments: if has_close {
                        format!(
                            "Activity '{}' has a matching 'Close' method for the 'Open' method of {info}.",
                            activity.name
                        )
                    } else {
                        format!(
                            "Activity '{}' is missing a 'Close' method for the 'Open' method of {info}.",
                            activity.name
                        )
                    },
                });
            }

            for close_method in &close_methods {
                let has_open = open_methods.iter().any(|item| item.object_id == close_method.object_id);
                if !has_open {
                    let info = connector_info(close_method.object_id);
                    results.push(RuleCheckResult {
                        rule: rule.clone(),
                        status,
                        source: activity.source_path(),
                        comments: format!(
                            "Activity '{}' has a 'Close' method without a corresponding 'Open' method for {info}.",
                            activity.name
                        ),
                    });
                }
            }
        }
        results
    }

    fn check_hardcoded_delays(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("HardcodedDelay", "Fail");
        let prohibited_types =
            self.config
                .get_string_array("HardcodedDelay", "ProhibitedTypes", &["WaitForTime"]);

        process
            .activities
            .iter()
            .map(|activity| {
                let has_delay = activity
                    .executable_items()
                    .any(|item| prohibited_types.contains(&item.item_type));
                RuleCheckResult {
                    rule: rule.clone(),
                    status: if has_delay { status } else { RuleCheckStatus::Pass },
                    source: activity.source_path(),
                    comments: if has_delay {
                        format!(
                            "Activity '{}' uses a hardcoded delay ({}).",
                            activity.name,
                            prohibited_types.join(", ")
                        )
                    } else {
                        format!("Activity '{}' does not use hardcoded delays.", activity.name)
                    },
                }
            })
            .collect()
    }

    /// Flags items whose delay or timeout settings deviate from the allowed
    /// defaults. Pass fallback is tracked with a per-activity flag rather
    /// than scanning the accumulated results for a source prefix.
    fn check_modified_delay_properties(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ModifiedDelayProperties", "Fail");
        let allowed_before = self.config.get_int("ModifiedDelayProperties", "AllowedBeforeDelay", 0) as i32;
        let allowed_after = self.config.get_int("ModifiedDelayProperties", "AllowedAfterDelay", 0) as i32;
        let allowed_timeout = self.config.get_bool("ModifiedDelayProperties", "AllowedEnableTimeout", false);

        let mut results = Vec::new();
        for activity in &process.activities {
            let mut activity_modified = false;
            for item in activity.executable_items() {
                let modified = item.before_delay > allowed_before
                    || item.after_delay > allowed_after
                    || item.enable_timeout != allowed_timeout;
                if modified {
                    activity_modified = true;
                    let name = if item.name.is_empty() { &item.item_type } else { &item.name };
                    results.push(RuleCheckResult {
                        rule: rule.clone(),
                        status,
                        source: activity.source_path(),
                        comments: format!(
                            "{name} in activity '{}' has modified delay properties: AfterDelay={}, BeforeDelay={}, EnableTimeout={}.",
                            activity.name, item.after_delay, item.before_delay, item.enable_timeout
                        ),
                    });
                }
            }
            if !activity_modified {
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: RuleCheckStatus::Pass,
                    source: activity.source_path(),
                    comments: format!(
                        "All DesignItems in activity '{}' have default delay properties.",
                        activity.name
                    ),
                });
            }
        }
        results
    }

    fn check_non_empty_comments(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("Comments", "Fail");
        let min_length = self.config.get_int("Comments", "MinCommentLength", 3) as usize;

        let mut results = Vec::new();
        for activity in &process.activities {
            let comment_items: Vec<_> = activity
                .items
                .iter()
                .filter_map(|item| item.as_generic())
                .filter(|item| item.item_type == "CommentBox")
                .collect();

            if comment_items.is_empty() {
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status,
                    source: activity.source_path(),
                    comments: "Comment not used.".to_string(),
                });
                continue;
            }

            let all_non_empty = comment_items
                .iter()
                .all(|item| !item.name.trim().is_empty() && item.name.len() >= min_length);
            results.push(RuleCheckResult {
                rule: rule.clone(),
                status: if all_non_empty { RuleCheckStatus::Pass } else { status },
                source: activity.source_path(),
                comments: if all_non_empty {
                    "Non-empty comments used.".to_string()
                } else {
                    format!("Comments are empty or too short. Minimum length: {min_length} characters.")
                },
            });
        }
        results
    }

    fn check_windows_screen_rules(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("WindowsScreenRules", "Warn");
        self.check_screen_match_rules(process, rule, status, "Windows", Screen::is_windows)
    }

    fn check_chrome_screen_rules(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ChromeScreenRules", "Warn");
        self.check_screen_match_rules(process, rule, status, "Chrome", Screen::is_chrome)
    }

    /// Screen-level match-rule hygiene shared by the Windows and Chrome
    /// rules: no enabled rules is a hard Fail; index rules, strict equality
    /// comparisons and digit-bearing comparison values are violations.
    fn check_screen_match_rules(
        &self,
        process: &Process,
        rule: Rule,
        status: RuleCheckStatus,
        label: &str,
        select: fn(&Screen) -> bool,
    ) -> Vec<RuleCheckResult> {
        let mut results = Vec::new();
        for screen in connector_screens(process, select) {
            let mut violations = Vec::new();
            let enabled_rules: Vec<_> =
                screen.match_rules.iter().filter(|rule| rule.enabled).collect();
            if enabled_rules.is_empty() {
                violations.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: RuleCheckStatus::Fail,
                    source: screen.source_path(),
                    comments: format!("{label} Screen '{}' has no match rules enabled.", screen.name),
                });
            }
            for match_rule in enabled_rules {
                match &match_rule.kind {
                    MatchRuleKind::Index { index } => {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "{label} Screen '{}' uses index property, Index = {index}.",
                                screen.name
                            ),
                        });
                    }
                    MatchRuleKind::StringComparer { comparer: Some(comparer) } => {
                        let rule_type = short_rule_type(&match_rule.rule_type);
                        if comparer.compare_type.eq_ignore_ascii_case("Equals") {
                            violations.push(RuleCheckResult {
                                rule: rule.clone(),
                                status,
                                source: screen.source_path(),
                                comments: format!(
                                    "{label} Screen '{}' uses strict 'Equals' comparison: {rule_type} {} '{}'.",
                                    screen.name, comparer.compare_type, comparer.comparison_value
                                ),
                            });
                        }
                        if contains_digit(&comparer.comparison_value) {
                            violations.push(RuleCheckResult {
                                rule: rule.clone(),
                                status,
                                source: screen.source_path(),
                                comments: format!(
                                    "{label} Screen '{}' match rule contains number: {rule_type} {} '{}'.",
                                    screen.name, comparer.compare_type, comparer.comparison_value
                                ),
                            });
                        }
                    }
                    _ => {}
                }
            }

            if violations.is_empty() {
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: RuleCheckStatus::Pass,
                    source: screen.source_path(),
                    comments: format!(
                        "{label} Screen '{}' follows all match rule best practices.",
                        screen.name
                    ),
                });
            } else {
                results.extend(violations);
            }
        }
        results
    }

    fn check_windows_element_rules(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("WindowsElementRules", "Warn");
        let prohibited_locators =
            self.config
                .get_string_array("WindowsElementRules", "ProhibitedLocators", &["Path"]);

        let mut results = Vec::new();
        for screen in connector_screens(process, Screen::is_windows) {
            let mut violations = Vec::new();
            for element in &screen.elements {
                if let Some(locator) = &element.selected_locator {
                    if prohibited_locators
                        .iter()
                        .any(|kind| kind.eq_ignore_ascii_case(&locator.locate_by))
                    {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "Window element '{}' uses prohibited locator, {} = '{}'.",
                                element.name, locator.locate_by, locator.value
                            ),
                        });
                    } else if contains_digit(&locator.value) {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "Window element '{}' locator contains digit, {} = '{}'.",
                                element.name, locator.locate_by, locator.value
                            ),
                        });
                    }
                }

                for match_rule in element.match_rules.iter().filter(|rule| rule.enabled) {
                    match &match_rule.kind {
                        MatchRuleKind::Index { index } => {
                            violations.push(RuleCheckResult {
                                rule: rule.clone(),
                                status,
                                source: screen.source_path(),
                                comments: format!(
                                    "Window Element '{}' uses an index match rule, Index = {index}.",
                                    element.name
                                ),
                            });
                        }
                        MatchRuleKind::StringComparer { comparer: Some(comparer) } => {
                            let rule_type = short_rule_type(&match_rule.rule_type);
                            if rule_type.eq_ignore_ascii_case("PathMatchRule") {
                                violations.push(RuleCheckResult {
                                    rule: rule.clone(),
                                    status,
                                    source: screen.source_path(),
                                    comments: format!(
                                        "Window element '{}' uses Path match rule, Path = '{}'.",
                                        element.name, comparer.comparison_value
                                    ),
                                });
                            } else if rule_type.eq_ignore_ascii_case("NameMatchRule")
                                && contains_digit(&comparer.comparison_value)
                            {
                                violations.push(RuleCheckResult {
                                    rule: rule.clone(),
                                    status,
                                    source: screen.source_path(),
                                    comments: format!(
                                        "Window element '{}' contains digit in match rule, Name = '{}'.",
                                        element.name, comparer.comparison_value
                                    ),
                                });
                            }
                        }
                        MatchRuleKind::Element { element_id, element_type } => {
                            if contains_digit(element_type) {
                                violations.push(RuleCheckResult {
                                    rule: rule.clone(),
                                    status,
                                    source: screen.source_path(),
                                    comments: format!(
                                        "Window element '{}' contains digit in match rule, Type = '{element_type}'.",
                                        element.name
                                    ),
                                });
                            }
                            if contains_digit(element_id) {
                                violations.push(RuleCheckResult {
                                    rule: rule.clone(),
                                    status,
                                    source: screen.source_path(),
                                    comments: format!(
                                        "Window element '{}' contains digit in match rule, ID = '{element_id}'.",
                                        element.name
                                    ),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }

            if violations.is_empty() {
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: RuleCheckStatus::Pass,
                    source: screen.source_path(),
                    comments: format!(
                        "All elements in Windows Screen '{}' follow locator and match rule best practices.",
                        screen.name
                    ),
                });
            } else {
                results.extend(violations);
            }
        }
        results
    }

    fn check_chrome_element_rules(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("ChromeElementRules", "Warn");
        let prohibited_properties = self.config.get_string_array(
            "ChromeElementRules",
            "ProhibitedJsMatchRuleProperties",
            &["Index"],
        );

        let mut results = Vec::new();
        for screen in connector_screens(process, Screen::is_chrome) {
            let mut violations = Vec::new();
            for element in &screen.elements {
                if let Some(locator) = &element.selected_locator {
                    if contains_digit(&locator.value) {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "Chrome element '{}' locator contains digit, {} = '{}'.",
                                element.name, locator.locate_by, locator.value
                            ),
                        });
                    }
                }

                for js_rule in element.js_match_rules.iter().filter(|rule| rule.enabled) {
                    let prohibited = js_rule.rule_type.eq_ignore_ascii_case("Property")
                        && prohibited_properties
                            .iter()
                            .any(|name| name.eq_ignore_ascii_case(&js_rule.name));
                    if prohibited {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "Chrome element '{}' uses prohibited JS match rule property: {} = {}.",
                                element.name, js_rule.name, js_rule.value
                            ),
                        });
                    } else if contains_digit(&js_rule.value) {
                        violations.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: screen.source_path(),
                            comments: format!(
                                "Chrome element '{}' JS match rule contains digit: {} {} '{}'.",
                                element.name, js_rule.name, js_rule.comparer, js_rule.value
                            ),
                        });
                    }
                }
            }

            if violations.is_empty() {
                results.push(RuleCheckResult {
                    rule: rule.clone(),
                    status: RuleCheckStatus::Pass,
                    source: screen.source_path(),
                    comments: format!(
                        "All elements in Chrome Screen '{}' follow locator and JS match rule best practices.",
                        screen.name
                    ),
                });
            } else {
                results.extend(violations);
            }
        }
        results
    }

    fn check_data_transform_usage(&self, process: &Process, rule: Rule) -> Vec<RuleCheckResult> {
        let status = self.failing_status("DataTransformUsage", "Warn");
        let mut results = Vec::new();
        let mut found_transform = false;

        for activity in &process.activities {
            for item in activity.executable_items() {
                if item.data_transforms.is_empty() {
                    continue;
                }
                found_transform = true;
                let name = if item.name.is_empty() { &item.item_type } else { &item.name };
                for transform in &item.data_transforms {
                    if transform.has_modified_script() {
                        if transform.enabled {
                            results.push(RuleCheckResult {
                                rule: rule.clone(),
                                status: RuleCheckStatus::Pass,
                                source: activity.source_path(),
                                comments: format!(
                                    "Data transform in '{name}' has a valid script and is enabled."
                                ),
                            });
                        } else {
                            results.push(RuleCheckResult {
                                rule: rule.clone(),
                                status,
                                source: activity.source_path(),
                                comments: format!(
                                    "Data transform in '{name}' has a valid script but is not enabled."
                                ),
                            });
                        }
                    } else if transform.enabled {
                        results.push(RuleCheckResult {
                            rule: rule.clone(),
                            status,
                            source: activity.source_path(),
                            comments: format!(
                                "Data transform in '{name}' has invalid/unmodified script and is enabled."
                            ),
                        });
                    }
                }
            }
        }

        if !found_transform {
            results.push(RuleCheckResult {
                rule,
                status: RuleCheckStatus::Pass,
                source: "Process".to_string(),
                comments: "No design items with data transforms found in the process".to_string(),
            });
        }
        results
    }
}

impl RuleChecker for CodeQualityChecker {
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

/// Screens of the given flavor across every universal-app connector, in
/// declaration order.
fn connector_screens(process: &Process, select: fn(&Screen) -> bool) -> impl Iterator<Item = &Screen> {
    process
        .variables
        .iter()
        .filter_map(|variable| variable.app_connector.as_ref())
        .flat_map(|connector| connector.screens.iter())
        .filter(move |screen| select(screen))
}

fn starts_with_any(method_name: &str, prefixes: &[String]) -> bool {
    if method_name.is_empty() {
        return false;
    }
    let method_name = method_name.to_lowercase();
    prefixes
        .iter()
        .any(|prefix| method_name.starts_with(&prefix.to_lowercase()))
}

fn contains_digit(value: &str) -> bool {
    HAS_DIGIT.is_match(value)
}
