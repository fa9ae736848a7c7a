use crate::model::{
    Activity, ActivityVariable, Connection, ControlPort, DataRef, DataTransform, DesignItem,
    ErrorHandling, ExecutableItem, GenericDesignItem, GlobalVariable, MappedVariable, OnErrorAction,
    Process, SystemPlugin, UserPlugin,
};
use crate::screens::{
    AppConnector, JsMatchRule, Locator, MatchRule, MatchRuleKind, Screen, ScreenElement, ScreenKind,
    StringCompare,
};
use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const UNIVERSAL_APP_TYPE: &str = "UTL.RPA.CONNECTORS.UAC.AutxUniversalApplication";
const CHROME_SCREEN_TYPE: &str = "UTL.RPA.CONNECTORS.WEB.CHROMEBROWSER.AutxWebScreen";
const WINDOWS_SCREEN_TYPE: &str = "UTL.RPA.CONNECTORS.WINDOWS.AutxWinScreen";

/// Parses a serialized bot definition from disk.
pub fn parse_bot_file(path: &Path) -> Result<Process> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("failed to read bot file: {}", path.display()))?;
    parse_bot_xml(&xml).with_context(|| format!("failed to parse bot file: {}", path.display()))
}

/// Parses a serialized bot definition from an XML string.
pub fn parse_bot_xml(xml: &str) -> Result<Process> {
    let root = Element::parse(xml)?;
    Ok(parse_process(&root))
}

/// An owned XML element tree. The bot format is element-heavy with a handful
/// of `xsi:type` attributes, so a plain tree with path lookups covers every
/// query the mapper needs.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Builds the tree for the document's root element.
    fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let mut element = Element {
                        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                        ..Element::default()
                    };
                    for attribute in start.attributes() {
                        let attribute = attribute?;
                        element.attributes.push((
                            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                            attribute.unescape_value()?.into_owned(),
                        ));
                    }
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let mut element = Element {
                        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                        ..Element::default()
                    };
                    for attribute in start.attributes() {
                        let attribute = attribute?;
                        element.attributes.push((
                            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                            attribute.unescape_value()?.into_owned(),
                        ));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    if let Some(element) = stack.last_mut() {
                        element.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(element) = stack.last_mut() {
                        element.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::End(_) => {
                    let element = match stack.pop() {
                        Some(element) => element,
                        None => bail!("unbalanced closing tag in bot definition"),
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Eof => bail!("bot definition has no root element"),
                _ => {}
            }
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Resolves a slash-delimited path of child element names, first match
    /// at each step.
    fn find(&self, path: &str) -> Option<&Element> {
        let mut current = self;
        for segment in path.split('/') {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Text content of the element at `path`, if it exists.
    fn value(&self, path: &str) -> Option<&str> {
        self.find(path).map(|element| element.text.as_str())
    }

    /// All elements with the given name anywhere in this subtree, document
    /// order.
    fn descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                out.push(child);
            }
            child.descendants(name, out);
        }
    }
}

fn parse_process(root: &Element) -> Process {
    Process {
        id: parse_uuid(root.value("ID")),
        startup_activity_id: parse_uuid(root.value("StartupActivityID")),
        plugins: parse_plugins(root),
        user_plugins: parse_user_plugins(root),
        activities: parse_activities(root),
        variables: parse_global_variables(root),
        description: owned_or_empty(root.value("Description")),
    }
}

fn parse_plugins(root: &Element) -> Vec<SystemPlugin> {
    let Some(references) = root.child("References") else {
        return Vec::new();
    };
    references
        .children_named("AutxPluginReference")
        .map(|node| SystemPlugin {
            id: parse_uuid(node.value("ID")),
            name: owned_or_empty(node.value("Name")),
            plugin_id: parse_uuid(node.value("PluginID")),
            version: owned_or_empty(node.value("Version")),
            signature: owned_or_empty(node.value("Signature")),
        })
        .collect()
}

fn parse_user_plugins(root: &Element) -> Vec<UserPlugin> {
    let Some(plugins) = root.child("UserPlugins") else {
        return Vec::new();
    };
    plugins
        .children_named("AutxUserPluginReference")
        .map(|node| UserPlugin {
            id: parse_uuid(node.value("ID")),
            name: owned_or_empty(node.value("Name")),
            plugin_id: parse_uuid(node.value("PluginID")),
            version: owned_or_empty(node.value("Version")),
            assembly_path: owned_or_empty(node.value("AssemblyPath")),
        })
        .collect()
}

fn parse_activities(root: &Element) -> Vec<Activity> {
    let Some(activities) = root.child("Activities") else {
        return Vec::new();
    };
    activities
        .children_named("AutxActivity")
        .map(|node| Activity {
            id: parse_uuid(node.value("ID")),
            parent_id: parse_uuid(node.value("ParentID")),
            name: owned_or_empty(node.value("Name")),
            variables: parse_activity_variables(node),
            items: parse_design_items(node),
            error_handling: ErrorHandling {
                on_error: OnErrorAction::parse(node.value("OnErrorAction"), OnErrorAction::Stop),
                max_retries: parse_i32(node.value("MaxRetries"), 0),
                retry_delay: parse_i32(node.value("RetryDelay"), 0),
                on_error_after_retry: OnErrorAction::parse(
                    node.value("OnErrorActionAfterRetry"),
                    OnErrorAction::Stop,
                ),
            },
            root_path: owned_or_empty(node.value("RootPath")),
        })
        .collect()
}

fn parse_activity_variables(activity_node: &Element) -> Vec<ActivityVariable> {
    let Some(variables) = activity_node.child("Variables") else {
        return Vec::new();
    };
    variables
        .children_named("AutxObject")
        .map(|node| ActivityVariable {
            id: parse_uuid(node.value("ID")),
            name: owned_or_empty(node.value("Name")),
            activity_id: parse_uuid(node.value("ActivityID")),
            root_path: owned_or_empty(node.value("RootPath")),
            data_type: owned_or_empty(node.attr("xsi:type")),
        })
        .collect()
}

fn parse_design_items(activity_node: &Element) -> Vec<DesignItem> {
    let Some(items) = activity_node.child("Items") else {
        return Vec::new();
    };
    items
        .children_named("DesignItem")
        .map(|node| {
            let item_type = node.attr("xsi:type").unwrap_or_default();
            match item_type {
                "AutxControlConnection" => DesignItem::Control(parse_connection(node, item_type)),
                "AutxDataConnection" => DesignItem::Data(parse_connection(node, item_type)),
                "AutxCommentConnection" => DesignItem::Comment(parse_connection(node, item_type)),
                _ => {
                    // A node is executable iff it exposes a control port;
                    // everything else (comment boxes, labels) stays generic.
                    let control_in = node.child("ControlIn").map(parse_control_port);
                    let control_out = node.child("ControlOut").map(parse_control_port);
                    if control_in.is_some() || control_out.is_some() {
                        DesignItem::Executable(parse_executable_item(
                            node, item_type, control_in, control_out,
                        ))
                    } else {
                        DesignItem::Generic(GenericDesignItem {
                            id: parse_uuid(node.value("ID")),
                            parent_id: parse_uuid(node.value("ParentID")),
                            item_type: item_type.to_string(),
                            name: owned_or_empty(node.value("Name")),
                            x: parse_f64(node.value("X")),
                            y: parse_f64(node.value("Y")),
                        })
                    }
                }
            }
        })
        .collect()
}

fn parse_connection(node: &Element, item_type: &str) -> Connection {
    Connection {
        id: parse_uuid(node.value("ID")),
        parent_id: parse_uuid(node.value("ParentID")),
        item_type: item_type.to_string(),
        source_component_id: parse_uuid(node.value("SourceComponentID")),
        source_port_id: parse_uuid(node.value("SourcePortID")),
        sink_component_id: parse_uuid(node.value("SinkComponentID")),
        sink_port_id: parse_uuid(node.value("SinkPortID")),
    }
}

fn parse_control_port(node: &Element) -> ControlPort {
    ControlPort {
        id: parse_uuid(node.value("ID")),
        name: owned_or_empty(node.value("Name")),
        visibility: parse_bool(node.value("Visibility")),
        allow_delete: parse_bool(node.value("AllowDelete")),
    }
}

fn parse_executable_item(
    node: &Element,
    item_type: &str,
    control_in: Option<ControlPort>,
    control_out: Option<ControlPort>,
) -> ExecutableItem {
    ExecutableItem {
        id: parse_uuid(node.value("ID")),
        parent_id: parse_uuid(node.value("ParentID")),
        item_type: item_type.to_string(),
        name: owned_or_empty(node.value("Name")),
        x: parse_f64(node.value("X")),
        y: parse_f64(node.value("Y")),
        breakpoint: parse_bool(node.value("BreakPoint")),
        control_in,
        control_out,
        error_handling: ErrorHandling {
            on_error: OnErrorAction::parse(node.value("OnErrorAction"), OnErrorAction::Inherit),
            max_retries: parse_i32(node.value("MaxRetries"), 1),
            retry_delay: parse_i32(node.value("RetryDelay"), 0),
            on_error_after_retry: OnErrorAction::parse(
                node.value("OnErrorActionAfterRetry"),
                OnErrorAction::Inherit,
            ),
        },
        before_delay: parse_i32(node.value("BeforeDelay"), 0),
        after_delay: parse_i32(node.value("AfterDelay"), 0),
        enable_timeout: parse_bool(node.value("EnableTimeout")),
        timeout: parse_i32(node.value("Timeout"), 60),
        comment_port_id: parse_uuid(node.value("CommentConnectionPort/ID")),
        class_name: owned_or_empty(node.value("ClassName")),
        method_name: owned_or_empty(node.value("MethodName")),
        object_id: parse_uuid(node.value("ObjectID")),
        error_out_port_id: parse_uuid(node.value("ErrorOut/ID")),
        error_message_port_id: parse_uuid(node.value("ErrorMessagePort/ID")),
        log_message: owned_or_empty(node.value("MessagePort/StaticValue")),
        log_mode: owned_or_empty(node.value("LogMode")),
        data_transforms: parse_data_transforms(node),
        mapped_variables: parse_mapped_variables(node),
    }
}

fn parse_data_transforms(item_node: &Element) -> Vec<DataTransform> {
    let mut nodes = Vec::new();
    item_node.descendants("DataTransform", &mut nodes);
    nodes
        .into_iter()
        .map(|node| DataTransform {
            id: parse_uuid(node.value("ID")),
            enabled: parse_bool(node.value("Enabled")),
            script: owned_or_empty(node.value("Script")),
            script_language: owned_or_empty(node.value("ScriptLanguage")),
            attribute_type: owned_or_empty(node.attr("xsi:type")),
        })
        .collect()
}

fn parse_mapped_variables(item_node: &Element) -> Vec<MappedVariable> {
    let mut nodes = Vec::new();
    item_node.descendants("MappedVariable", &mut nodes);
    nodes
        .into_iter()
        .map(|node| MappedVariable {
            id: parse_uuid(node.value("ID")),
            is_global: parse_bool(node.value("IsGlobal")),
            data_in: node.child("DataIn").map(parse_data_ref),
            data_out: node.child("DataOut").map(parse_data_ref),
        })
        .collect()
}

fn parse_data_ref(node: &Element) -> DataRef {
    DataRef {
        id: parse_uuid(node.value("ID")),
        name: owned_or_empty(node.value("Name")),
    }
}

fn parse_global_variables(root: &Element) -> Vec<GlobalVariable> {
    let Some(variables) = root.child("Variables") else {
        return Vec::new();
    };
    variables
        .children_named("AutxObject")
        .map(|node| {
            let data_type = node.attr("xsi:type").unwrap_or_default().to_string();
            let app_connector = (data_type == UNIVERSAL_APP_TYPE).then(|| parse_app_connector(node));
            GlobalVariable {
                id: parse_uuid(node.value("ID")),
                name: owned_or_empty(node.value("Name")),
                root_path: owned_or_empty(node.value("RootPath")),
                data_type,
                app_connector,
            }
        })
        .collect()
}

fn parse_app_connector(node: &Element) -> AppConnector {
    AppConnector {
        process_id: parse_uuid(node.value("ProcessID")),
        is_remote_execution_enabled: parse_bool(node.value("IsRemoteExecutionEnabled")),
        isolation_platform: owned_or_empty(node.value("IsolationPlatform")),
        isolation_session_type: owned_or_empty(node.value("IsolationSessionType")),
        screens: parse_screens(node),
    }
}

fn parse_screens(connector_node: &Element) -> Vec<Screen> {
    let Some(items) = connector_node.child("Items") else {
        return Vec::new();
    };
    items
        .children_named("AutxObject")
        .map(|node| {
            let screen_type = node.attr("xsi:type").unwrap_or_default();
            let kind = match screen_type {
                CHROME_SCREEN_TYPE => ScreenKind::Chrome {
                    browser_type: owned_or_empty(node.value("BrowserType")),
                },
                WINDOWS_SCREEN_TYPE => ScreenKind::Windows,
                _ => ScreenKind::Generic,
            };
            Screen {
                id: parse_uuid(node.value("ID")),
                name: owned_or_empty(node.value("Name")),
                screen_type: screen_type.to_string(),
                root_path: owned_or_empty(node.value("RootPath")),
                kind,
                match_rules: parse_match_rules(node.child("MatchRules")),
                elements: parse_screen_elements(node.child("Items")),
                locators: parse_locators(node.child("Locators")),
                selected_locator: node.child("Locator").map(parse_selected_locator),
            }
        })
        .collect()
}

fn parse_screen_elements(items_node: Option<&Element>) -> Vec<ScreenElement> {
    let Some(items) = items_node else {
        return Vec::new();
    };
    items
        .children
        .iter()
        .map(|node| ScreenElement {
            id: parse_uuid(node.value("ID")),
            name: owned_or_empty(node.value("Name")),
            element_type: owned_or_empty(node.attr("xsi:type")),
            root_path: owned_or_empty(node.value("RootPath")),
            match_rules: parse_match_rules(node.child("MatchRules")),
            js_match_rules: parse_js_match_rules(node.child("JsMatchRules")),
            locators: parse_locators(node.child("Locators")),
            selected_locator: node.child("Locator").map(parse_selected_locator),
            match_criteria: owned_or_empty(node.value("MatchCriteria")),
        })
        .collect()
}

fn parse_match_rules(rules_node: Option<&Element>) -> Vec<MatchRule> {
    let Some(rules) = rules_node else {
        return Vec::new();
    };
    rules
        .children
        .iter()
        .map(|node| {
            let rule_type = node.attr("xsi:type").unwrap_or_default();
            let kind = match rule_type {
                "UTL.RPA.CONNECTORS.WEB.CHROMEBROWSER.TitleMatchRule"
                | "UTL.RPA.CONNECTORS.WEB.CHROMEBROWSER.UrlMatchRule"
                | "UTL.RPA.CONNECTORS.WINDOWS.TitleMatchRule"
                | "UTL.RPA.CONNECTORS.WINDOWS.ClassMatchRule"
                | "UTL.RPA.CONNECTORS.WINDOWS.NameMatchRule"
                | "UTL.RPA.CONNECTORS.WINDOWS.PathMatchRule" => MatchRuleKind::StringComparer {
                    comparer: node.child("Comparer").map(|comparer| StringCompare {
                        comparison_value: owned_or_empty(comparer.value("ComparisonValue")),
                        compare_type: owned_or_empty(comparer.value("Type")),
                    }),
                },
                "UTL.RPA.CONNECTORS.WEB.CHROMEBROWSER.IndexMatchRule"
                | "UTL.RPA.CONNECTORS.WINDOWS.IndexMatchRule" => MatchRuleKind::Index {
                    index: parse_i32(node.value("Index"), 0),
                },
                "UTL.RPA.CONNECTORS.WINDOWS.IDMatchRule" => MatchRuleKind::Element {
                    element_id: owned_or_empty(node.value("ElementID")),
                    element_type: String::new(),
                },
                "UTL.RPA.CONNECTORS.WINDOWS.TypeMatchRule" => MatchRuleKind::Element {
                    element_id: String::new(),
                    element_type: owned_or_empty(node.value("ElementType")),
                },
                _ => MatchRuleKind::Generic,
            };
            MatchRule {
                id: parse_uuid(node.value("ID")),
                enabled: parse_bool(node.value("Enabled")),
                rule_type: rule_type.to_string(),
                kind,
            }
        })
        .collect()
}

fn parse_js_match_rules(rules_node: Option<&Element>) -> Vec<JsMatchRule> {
    let Some(rules) = rules_node else {
        return Vec::new();
    };
    rules
        .children
        .iter()
        .map(|node| JsMatchRule {
            id: parse_uuid(node.value("ID")),
            j_id: parse_uuid(node.value("JID")),
            rule_type: owned_or_empty(node.value("Type")),
            name: owned_or_empty(node.value("Name")),
            comparer: owned_or_empty(node.value("Comparer")),
            value: owned_or_empty(node.value("Value")),
            ignore_case: parse_bool(node.value("IgnoreCase")),
            escape: parse_bool(node.value("Escape")),
            trim: parse_bool(node.value("Trim")),
            enabled: parse_bool(node.value("Enabled")),
        })
        .collect()
}

fn parse_locators(locators_node: Option<&Element>) -> Vec<Locator> {
    let Some(locators) = locators_node else {
        return Vec::new();
    };
    locators
        .children
        .iter()
        .map(|node| Locator {
            id: parse_uuid(node.value("ID")),
            locate_by: owned_or_empty(node.value("LocateBy")),
            value: owned_or_empty(node.value("Value")),
            selected: parse_bool(node.value("Selected")),
        })
        .collect()
}

fn parse_selected_locator(node: &Element) -> Locator {
    Locator {
        id: parse_uuid(node.value("ID")),
        locate_by: owned_or_empty(node.value("LocateBy")),
        value: owned_or_empty(node.value("Value")),
        selected: true,
    }
}

fn parse_uuid(value: Option<&str>) -> Uuid {
    value
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .unwrap_or_else(Uuid::nil)
}

fn parse_i32(value: Option<&str>, default: i32) -> i32 {
    value.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

fn parse_f64(value: Option<&str>) -> f64 {
    value.and_then(|value| value.trim().parse().ok()).unwrap_or(0.0)
}

fn parse_bool(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn owned_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
