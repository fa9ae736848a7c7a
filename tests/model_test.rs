use botlint::model::{
    connector_category, Activity, Connection, ControlPort, DataTransform, DesignItem,
    ExecutableItem, GenericDesignItem, GlobalVariable,
};
use botlint::screens::short_rule_type;
use uuid::Uuid;

fn executable(item_type: &str, in_port: Option<Uuid>, out_port: Option<Uuid>) -> ExecutableItem {
    ExecutableItem {
        id: Uuid::new_v4(),
        item_type: item_type.to_string(),
        control_in: in_port.map(|id| ControlPort { id, ..ControlPort::default() }),
        control_out: out_port.map(|id| ControlPort { id, ..ControlPort::default() }),
        ..ExecutableItem::default()
    }
}

fn control_connection(source_port: Uuid, sink_port: Uuid) -> Connection {
    Connection {
        id: Uuid::new_v4(),
        item_type: "AutxControlConnection".to_string(),
        source_port_id: source_port,
        sink_port_id: sink_port,
        ..Connection::default()
    }
}

#[test]
fn test_navigation_follows_control_connections() {
    let entry_out = Uuid::new_v4();
    let log_in = Uuid::new_v4();

    let activity = Activity {
        name: "Main".to_string(),
        root_path: "Activities".to_string(),
        items: vec![
            DesignItem::Executable(executable("EntryPoint", None, Some(entry_out))),
            DesignItem::Control(control_connection(entry_out, log_in)),
            DesignItem::Executable(executable("LogWriter", Some(log_in), None)),
        ],
        ..Activity::default()
    };

    let connection = activity.control_connection_with_source_port(Some(entry_out));
    assert!(connection.is_some(), "connection reachable from entry port");

    let sink = connection.map(|c| c.sink_port_id);
    let target = activity.executable_item_with_control_in_port(sink);
    assert_eq!(target.map(|item| item.item_type.as_str()), Some("LogWriter"));

    assert_eq!(activity.source_path(), "Activities/Main");
}

#[test]
fn test_nil_ports_never_match() {
    let activity = Activity {
        items: vec![DesignItem::Control(control_connection(Uuid::nil(), Uuid::nil()))],
        ..Activity::default()
    };

    // Absent ports are represented as None and must not match the nil
    // sentinel carried by a malformed connection.
    assert!(activity.control_connection_with_source_port(None).is_none());
    assert!(activity.executable_item_with_control_in_port(None).is_none());
    assert!(activity.control_connections_with_sink_port(None).is_empty());
}

#[test]
fn test_executable_items_skips_generic_and_connections() {
    let activity = Activity {
        items: vec![
            DesignItem::Generic(GenericDesignItem {
                item_type: "CommentBox".to_string(),
                ..GenericDesignItem::default()
            }),
            DesignItem::Executable(executable("LogWriter", None, None)),
            DesignItem::Control(control_connection(Uuid::new_v4(), Uuid::new_v4())),
        ],
        ..Activity::default()
    };

    assert_eq!(activity.executable_items().count(), 1);
    assert!(activity.executable_item_of_type("LogWriter").is_some());
    assert!(activity.executable_item_of_type("CommentBox").is_none());
}

#[test]
fn test_connector_category_strips_type_prefix() {
    assert_eq!(connector_category("UTL.RPA.CONNECTORS.AutxQueue"), "Queue");
    assert_eq!(connector_category("UTL.RPA.CONNECTORS.UAC.AutxUniversalApplication"), "UniversalApplication");
    assert_eq!(connector_category("SomethingElse"), "SomethingElse");

    let queue = GlobalVariable {
        data_type: "UTL.RPA.CONNECTORS.AutxQueue".to_string(),
        ..GlobalVariable::default()
    };
    assert!(!queue.is_plain_variable());
    assert_eq!(queue.connector_category(), "Queue");

    let plain = GlobalVariable {
        data_type: "AutxVariable".to_string(),
        ..GlobalVariable::default()
    };
    assert!(plain.is_plain_variable());
}

#[test]
fn test_connector_category_with_non_ascii_type_names() {
    // Multi-byte characters around the marker must not throw the slice
    // off a char boundary.
    assert_eq!(connector_category("\u{130}autx\u{c0}Queue"), "\u{c0}Queue");
    assert_eq!(connector_category("CONNECTORS.ÜTL.AutxQueue"), "Queue");
    assert_eq!(connector_category("Äpp.Connector"), "Äpp.Connector");
}

#[test]
fn test_data_transform_modified_script() {
    let untouched = DataTransform {
        script: "Return Value".to_string(),
        ..DataTransform::default()
    };
    assert!(!untouched.has_modified_script());

    let empty = DataTransform::default();
    assert!(!empty.has_modified_script());

    let edited = DataTransform {
        script: "value.trim()".to_string(),
        ..DataTransform::default()
    };
    assert!(edited.has_modified_script());
}

#[test]
fn test_short_rule_type() {
    assert_eq!(short_rule_type("UTL.RPA.CONNECTORS.WINDOWS.NameMatchRule"), "NameMatchRule");
    assert_eq!(short_rule_type("NameMatchRule"), "NameMatchRule");
}
