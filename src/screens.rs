use uuid::Uuid;

/// Extra payload carried by a universal-application connector variable:
/// remote-execution settings and the screens it automates.
#[derive(Debug, Clone, Default)]
pub struct AppConnector {
    pub process_id: Uuid,
    pub is_remote_execution_enabled: bool,
    pub isolation_platform: String,
    pub isolation_session_type: String,
    pub screens: Vec<Screen>,
}

/// Discriminates the concrete screen flavor. The serialized type string is
/// kept on the screen itself for rule matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScreenKind {
    Chrome {
        browser_type: String,
    },
    Windows,
    #[default]
    Generic,
}

/// A UI screen registered on an app connector.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    pub id: Uuid,
    pub name: String,
    pub screen_type: String,
    pub root_path: String,
    pub kind: ScreenKind,
    pub match_rules: Vec<MatchRule>,
    pub elements: Vec<ScreenElement>,
    pub locators: Vec<Locator>,
    pub selected_locator: Option<Locator>,
}

impl Screen {
    pub fn is_windows(&self) -> bool {
        self.kind == ScreenKind::Windows
    }

    pub fn is_chrome(&self) -> bool {
        matches!(self.kind, ScreenKind::Chrome { .. })
    }

    pub fn source_path(&self) -> String {
        format!("{}/{}", self.root_path, self.name)
    }
}

/// A UI element inside a screen.
#[derive(Debug, Clone, Default)]
pub struct ScreenElement {
    pub id: Uuid,
    pub name: String,
    pub element_type: String,
    pub root_path: String,
    pub match_rules: Vec<MatchRule>,
    pub js_match_rules: Vec<JsMatchRule>,
    pub locators: Vec<Locator>,
    pub selected_locator: Option<Locator>,
    pub match_criteria: String,
}

/// A strategy for identifying a screen or element at runtime. The rule type
/// string (e.g. "UTL.RPA.CONNECTORS.WINDOWS.NameMatchRule") stays free text;
/// the kind enum closes over the shapes the checkers understand.
#[derive(Debug, Clone, Default)]
pub struct MatchRule {
    pub id: Uuid,
    pub enabled: bool,
    pub rule_type: String,
    pub kind: MatchRuleKind,
}

#[derive(Debug, Clone, Default)]
pub enum MatchRuleKind {
    StringComparer {
        comparer: Option<StringCompare>,
    },
    Index {
        index: i32,
    },
    Element {
        element_id: String,
        element_type: String,
    },
    #[default]
    Generic,
}

/// Comparison payload of a string-comparer match rule.
#[derive(Debug, Clone, Default)]
pub struct StringCompare {
    pub comparison_value: String,
    pub compare_type: String,
}

/// A JavaScript-backed match rule on a Chrome screen element.
#[derive(Debug, Clone, Default)]
pub struct JsMatchRule {
    pub id: Uuid,
    pub j_id: Uuid,
    pub rule_type: String,
    pub name: String,
    pub comparer: String,
    pub value: String,
    pub ignore_case: bool,
    pub escape: bool,
    pub trim: bool,
    pub enabled: bool,
}

/// A resolved strategy+value pair used to find a UI element.
#[derive(Debug, Clone, Default)]
pub struct Locator {
    pub id: Uuid,
    pub locate_by: String,
    pub value: String,
    pub selected: bool,
}

/// Shortens a fully qualified match-rule type to its final segment:
/// "UTL.RPA.CONNECTORS.WINDOWS.NameMatchRule" becomes "NameMatchRule".
pub fn short_rule_type(rule_type: &str) -> &str {
    match rule_type.rfind('.') {
        Some(index) => rule_type[index + 1..].trim(),
        None => rule_type,
    }
}
