use crate::screens::AppConnector;
use uuid::Uuid;

/// Root aggregate for one parsed bot definition.
///
/// Built once per analysis run by the parser and treated as immutable
/// afterwards; the rule checkers only read it.
#[derive(Debug, Clone, Default)]
pub struct Process {
    pub id: Uuid,
    /// Id of the activity marked as the startup entry. Not structurally
    /// enforced against `activities`; a Framework rule checks it.
    pub startup_activity_id: Uuid,
    pub plugins: Vec<SystemPlugin>,
    pub user_plugins: Vec<UserPlugin>,
    pub activities: Vec<Activity>,
    pub variables: Vec<GlobalVariable>,
    pub description: String,
}

/// A plugin reference shipped with the platform.
#[derive(Debug, Clone, Default)]
pub struct SystemPlugin {
    pub id: Uuid,
    pub name: String,
    pub plugin_id: Uuid,
    pub version: String,
    pub signature: String,
}

/// A plugin reference supplied by the bot author.
#[derive(Debug, Clone, Default)]
pub struct UserPlugin {
    pub id: Uuid,
    pub name: String,
    pub plugin_id: Uuid,
    pub version: String,
    pub assembly_path: String,
}

/// What a component does when its execution fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnErrorAction {
    Stop,
    Continue,
    Retry,
    /// Defer to the enclosing scope. The designer default for executable
    /// items; deviating from it is what `ComponentErrorHandlerComment`
    /// looks for.
    #[default]
    Inherit,
}

impl OnErrorAction {
    /// Parses the serialized name, falling back to `default` on anything
    /// unrecognized.
    pub fn parse(value: Option<&str>, default: OnErrorAction) -> OnErrorAction {
        match value {
            Some("Stop") => OnErrorAction::Stop,
            Some("Continue") => OnErrorAction::Continue,
            Some("Retry") => OnErrorAction::Retry,
            Some("Inherit") => OnErrorAction::Inherit,
            _ => default,
        }
    }
}

/// Error-handling policy carried by activities and executable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorHandling {
    pub on_error: OnErrorAction,
    pub max_retries: i32,
    pub retry_delay: i32,
    pub on_error_after_retry: OnErrorAction,
}

impl Default for ErrorHandling {
    fn default() -> Self {
        Self {
            on_error: OnErrorAction::Inherit,
            max_retries: 1,
            retry_delay: 0,
            on_error_after_retry: OnErrorAction::Inherit,
        }
    }
}

/// A named unit of control flow: a canvas of connected design items.
///
/// Activities form an implicit hierarchy via `parent_id` and are organized
/// for display by the slash-delimited `root_path`.
#[derive(Debug, Clone, Default)]
pub struct Activity {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Uuid,
    pub variables: Vec<ActivityVariable>,
    pub items: Vec<DesignItem>,
    pub error_handling: ErrorHandling,
    pub root_path: String,
}

/// Anything placed on an activity's canvas: a node, an annotation, or an
/// edge. The variant set is closed; the free-text type tag stays open
/// because the universe of component types is extensible and the rule
/// checkers match on literal strings like "EntryPoint" or "CatchError".
#[derive(Debug, Clone)]
pub enum DesignItem {
    Generic(GenericDesignItem),
    Executable(ExecutableItem),
    Control(Connection),
    Data(Connection),
    Comment(Connection),
}

impl DesignItem {
    pub fn as_executable(&self) -> Option<&ExecutableItem> {
        match self {
            DesignItem::Executable(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericDesignItem> {
        match self {
            DesignItem::Generic(item) => Some(item),
            _ => None,
        }
    }
}

/// A non-executable canvas item, e.g. a "CommentBox".
#[derive(Debug, Clone, Default)]
pub struct GenericDesignItem {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub item_type: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// A control port on an executable item. In and out ports share this shape.
#[derive(Debug, Clone, Default)]
pub struct ControlPort {
    pub id: Uuid,
    pub name: String,
    pub visibility: bool,
    pub allow_delete: bool,
}

/// An executable node in the control-flow graph.
///
/// Absent ids (comment port, object id, error ports) carry the nil sentinel
/// produced by the parser rather than an `Option`.
#[derive(Debug, Clone)]
pub struct ExecutableItem {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub item_type: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub breakpoint: bool,
    pub control_in: Option<ControlPort>,
    pub control_out: Option<ControlPort>,
    pub error_handling: ErrorHandling,
    pub before_delay: i32,
    pub after_delay: i32,
    pub enable_timeout: bool,
    pub timeout: i32,
    pub comment_port_id: Uuid,
    pub class_name: String,
    pub method_name: String,
    pub object_id: Uuid,
    pub error_out_port_id: Uuid,
    pub error_message_port_id: Uuid,
    pub log_message: String,
    pub log_mode: String,
    pub data_transforms: Vec<DataTransform>,
    pub mapped_variables: Vec<MappedVariable>,
}

impl Default for ExecutableItem {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            parent_id: Uuid::nil(),
            item_type: String::new(),
            name: String::new(),
            x: 0.0,
            y: 0.0,
            breakpoint: false,
            control_in: None,
            control_out: None,
            error_handling: ErrorHandling::default(),
            before_delay: 0,
            after_delay: 0,
            enable_timeout: false,
            timeout: 60,
            comment_port_id: Uuid::nil(),
            class_name: String::new(),
            method_name: String::new(),
            object_id: Uuid::nil(),
            error_out_port_id: Uuid::nil(),
            error_message_port_id: Uuid::nil(),
            log_message: String::new(),
            log_mode: String::new(),
            data_transforms: Vec::new(),
            mapped_variables: Vec::new(),
        }
    }
}

/// A directed edge between two ports within one activity's item list.
/// Used for control, data and comment connections alike; the enclosing
/// `DesignItem` variant tells them apart.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub item_type: String,
    pub source_component_id: Uuid,
    pub source_port_id: Uuid,
    pub sink_component_id: Uuid,
    pub sink_port_id: Uuid,
}

/// A script attached to a data mapping.
#[derive(Debug, Clone, Default)]
pub struct DataTransform {
    pub id: Uuid,
    pub enabled: bool,
    pub script: String,
    pub script_language: String,
    pub attribute_type: String,
}

impl DataTransform {
    /// True when the script was actually edited: non-empty and not the
    /// designer placeholder.
    pub fn has_modified_script(&self) -> bool {
        !self.script.is_empty() && self.script != "Return Value"
    }
}

/// Binds an executable item's data port to a DataIn/DataOut reference.
#[derive(Debug, Clone, Default)]
pub struct MappedVariable {
    pub id: Uuid,
    pub is_global: bool,
    pub data_in: Option<DataRef>,
    pub data_out: Option<DataRef>,
}

/// A DataIn or DataOut endpoint of a mapped variable.
#[derive(Debug, Clone, Default)]
pub struct DataRef {
    pub id: Uuid,
    pub name: String,
}

/// Whether a data type names a plain variable or an external connector.
pub const PLAIN_VARIABLE_TYPE: &str = "AutxVariable";

/// A process-level variable slot. A data type other than `AutxVariable`
/// denotes a connector (queue, browser session, UI-automation target);
/// universal-app connectors additionally carry screen definitions.
#[derive(Debug, Clone, Default)]
pub struct GlobalVariable {
    pub id: Uuid,
    pub name: String,
    pub root_path: String,
    pub data_type: String,
    pub app_connector: Option<AppConnector>,
}

impl GlobalVariable {
    pub fn is_plain_variable(&self) -> bool {
        self.data_type == PLAIN_VARIABLE_TYPE
    }

    /// Display category for a connector type string: everything up to and
    /// including the last case-insensitive "autx" is stripped.
    /// "UTL.RPA.CONNECTORS.AutxQueue" becomes "Queue".
    pub fn connector_category(&self) -> String {
        connector_category(&self.data_type)
    }
}

pub fn connector_category(data_type: &str) -> String {
    const MARKER: &str = "autx";
    // The marker is ASCII, so a matching window always lands on char
    // boundaries; scanning windows directly avoids indexing the original
    // string with offsets from a lowercased copy, whose byte lengths can
    // differ for non-ASCII type names.
    let mut tail_start = None;
    for (index, _) in data_type.char_indices() {
        if let Some(window) = data_type.get(index..index + MARKER.len()) {
            if window.eq_ignore_ascii_case(MARKER) {
                tail_start = Some(index + MARKER.len());
            }
        }
    }
    match tail_start {
        Some(start) => data_type[start..].trim().to_string(),
        None => data_type.to_string(),
    }
}

/// An activity-scoped variable slot.
#[derive(Debug, Clone, Default)]
pub struct ActivityVariable {
    pub id: Uuid,
    pub name: String,
    pub activity_id: Uuid,
    pub root_path: String,
    pub data_type: String,
}

impl Activity {
    /// Executable items in insertion order as parsed.
    pub fn executable_items(&self) -> impl Iterator<Item = &ExecutableItem> {
        self.items.iter().filter_map(DesignItem::as_executable)
    }

    /// First executable item with the given type tag.
    pub fn executable_item_of_type(&self, item_type: &str) -> Option<&ExecutableItem> {
        self.executable_items().find(|item| item.item_type == item_type)
    }

    /// Source path used in rule results: "<root path>/<name>".
    pub fn source_path(&self) -> String {
        format!("{}/{}", self.root_path, self.name)
    }

    pub fn control_connection_with_source_port(&self, port_id: Option<Uuid>) -> Option<&Connection> {
        let port_id = port_id?;
        self.items.iter().find_map(|item| match item {
            DesignItem::Control(connection) if connection.source_port_id == port_id => {
                Some(connection)
            }
            _ => None,
        })
    }

    pub fn control_connection_with_sink_port(&self, port_id: Option<Uuid>) -> Option<&Connection> {
        let port_id = port_id?;
        self.items.iter().find_map(|item| match item {
            DesignItem::Control(connection) if connection.sink_port_id == port_id => {
                Some(connection)
            }
            _ => None,
        })
    }

    /// ALL control connections feeding a sink port. A control-out port may
    /// fan out to several sinks; a sink port normally receives a single
    /// edge but the lookup tolerates multiplicity.
    pub fn control_connections_with_sink_port(&self, port_id: Option<Uuid>) -> Vec<&Connection> {
        let Some(port_id) = port_id else {
            return Vec::new();
        };
        self.items
            .iter()
            .filter_map(|item| match item {
                DesignItem::Control(connection) if connection.sink_port_id == port_id => {
                    Some(connection)
                }
                _ => None,
            })
            .collect()
    }

    pub fn data_connection_with_source_port(&self, port_id: Option<Uuid>) -> Option<&Connection> {
        let port_id = port_id?;
        self.items.iter().find_map(|item| match item {
            DesignItem::Data(connection) if connection.source_port_id == port_id => {
                Some(connection)
            }
            _ => None,
        })
    }

    pub fn comment_connection_with_source_port(&self, port_id: Option<Uuid>) -> Option<&Connection> {
        let port_id = port_id?;
        self.items.iter().find_map(|item| match item {
            DesignItem::Comment(connection) if connection.source_port_id == port_id => {
                Some(connection)
            }
            _ => None,
        })
    }

    /// Node owning the given control-in port.
    pub fn executable_item_with_control_in_port(&self, port_id: Option<Uuid>) -> Option<&ExecutableItem> {
        let port_id = port_id?;
        self.executable_items()
            .find(|item| item.control_in.as_ref().is_some_and(|port| port.id == port_id))
    }

    /// Node owning the given control-out port.
    pub fn executable_item_with_control_out_port(&self, port_id: Option<Uuid>) -> Option<&ExecutableItem> {
        let port_id = port_id?;
        self.executable_items()
            .find(|item| item.control_out.as_ref().is_some_and(|port| port.id == port_id))
    }
}
