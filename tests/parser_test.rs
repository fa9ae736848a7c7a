use botlint::model::{DesignItem, OnErrorAction};
use botlint::parser::{parse_bot_file, parse_bot_xml};
use botlint::screens::{MatchRuleKind, ScreenKind};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;
use uuid::Uuid;

const BOT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<AutxProcess xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <ID>11111111-1111-1111-1111-111111111111</ID>
  <StartupActivityID>22222222-2222-2222-2222-222222222222</StartupActivityID>
  <Description>Invoice processing bot</Description>
  <References>
    <AutxPluginReference>
      <ID>33333333-3333-3333-3333-333333333333</ID>
      <Name>Core</Name>
      <Version>1.2.0</Version>
    </AutxPluginReference>
  </References>
  <Activities>
    <AutxActivity>
      <ID>22222222-2222-2222-2222-222222222222</ID>
      <Name>Main</Name>
      <RootPath>Activities</RootPath>
      <OnErrorAction>Continue</OnErrorAction>
      <Items>
        <DesignItem xsi:type="EntryPoint">
          <ID>44444444-4444-4444-4444-444444444444</ID>
          <Name>Start</Name>
          <ControlOut>
            <ID>55555555-5555-5555-5555-555555555555</ID>
            <Name>Out</Name>
          </ControlOut>
        </DesignItem>
        <DesignItem xsi:type="AutxControlConnection">
          <ID>66666666-6666-6666-6666-666666666666</ID>
          <SourcePortID>55555555-5555-5555-5555-555555555555</SourcePortID>
          <SinkPortID>77777777-7777-7777-7777-777777777777</SinkPortID>
        </DesignItem>
        <DesignItem xsi:type="LogWriter">
          <ID>88888888-8888-8888-8888-888888888888</ID>
          <Name>Log Start</Name>
          <ControlIn>
            <ID>77777777-7777-7777-7777-777777777777</ID>
          </ControlIn>
          <LogMode>INFO</LogMode>
          <MessagePort>
            <StaticValue>Main started processing</StaticValue>
          </MessagePort>
        </DesignItem>
        <DesignItem xsi:type="CommentBox">
          <ID>99999999-9999-9999-9999-999999999999</ID>
          <Name>Reads the invoice queue</Name>
        </DesignItem>
      </Items>
      <Variables>
        <AutxObject xsi:type="AutxVariable">
          <ID>aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa</ID>
          <Name>rowIndex</Name>
          <RootPath>Activities/Main/Variables</RootPath>
        </AutxObject>
      </Variables>
    </AutxActivity>
  </Activities>
  <Variables>
    <AutxObject xsi:type="AutxVariable">
      <ID>bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb</ID>
      <Name>transactionId</Name>
      <RootPath>Global Objects/Variables</RootPath>
    </AutxObject>
    <AutxObject xsi:type="UTL.RPA.CONNECTORS.UAC.AutxUniversalApplication">
      <ID>cccccccc-cccc-cccc-cccc-cccccccccccc</ID>
      <Name>DesktopApp</Name>
      <RootPath>Global Objects/UniversalApplication</RootPath>
      <Items>
        <AutxObject xsi:type="UTL.RPA.CONNECTORS.WINDOWS.AutxWinScreen">
          <ID>dddddddd-dddd-dddd-dddd-dddddddddddd</ID>
          <Name>MainWindow</Name>
          <RootPath>Screens</RootPath>
          <MatchRules>
            <MatchRule xsi:type="UTL.RPA.CONNECTORS.WINDOWS.TitleMatchRule">
              <ID>eeeeeeee-eeee-eeee-eeee-eeeeeeeeeeee</ID>
              <Enabled>true</Enabled>
              <Comparer>
                <ComparisonValue>Invoices</ComparisonValue>
                <Type>Contains</Type>
              </Comparer>
            </MatchRule>
            <MatchRule xsi:type="UTL.RPA.CONNECTORS.WINDOWS.IndexMatchRule">
              <ID>ffffffff-ffff-ffff-ffff-ffffffffffff</ID>
              <Enabled>false</Enabled>
              <Index>2</Index>
            </MatchRule>
          </MatchRules>
        </AutxObject>
      </Items>
    </AutxObject>
  </Variables>
</AutxProcess>
"#;

#[test]
fn test_parse_full_document() {
    let process = parse_bot_xml(BOT_XML).unwrap();

    assert_eq!(process.id, "11111111-1111-1111-1111-111111111111".parse::<Uuid>().unwrap());
    assert_eq!(process.description, "Invoice processing bot");
    assert_eq!(process.plugins.len(), 1);
    assert_eq!(process.plugins[0].name, "Core");
    assert_eq!(process.activities.len(), 1);

    let main = &process.activities[0];
    assert_eq!(main.name, "Main");
    assert_eq!(main.error_handling.on_error, OnErrorAction::Continue);
    assert_eq!(main.variables.len(), 1);
    assert_eq!(main.variables[0].name, "rowIndex");
    assert_eq!(main.variables[0].data_type, "AutxVariable");
    assert_eq!(process.startup_activity_id, main.id);
}

#[test]
fn test_design_item_classification() {
    let process = parse_bot_xml(BOT_XML).unwrap();
    let items = &process.activities[0].items;
    assert_eq!(items.len(), 4);

    // Control ports decide executable vs generic; the connection has its
    // own xsi:type.
    assert!(matches!(&items[0], DesignItem::Executable(item) if item.item_type == "EntryPoint"));
    assert!(matches!(&items[1], DesignItem::Control(_)));
    assert!(matches!(&items[2], DesignItem::Executable(item) if item.item_type == "LogWriter"));
    assert!(matches!(&items[3], DesignItem::Generic(item) if item.item_type == "CommentBox"));

    let log = items[2].as_executable().unwrap();
    assert_eq!(log.log_message, "Main started processing");
    assert_eq!(log.log_mode, "INFO");
}

#[test]
fn test_executable_item_defaults() {
    let process = parse_bot_xml(BOT_XML).unwrap();
    let entry = process.activities[0].items[0].as_executable().unwrap();

    assert_eq!(entry.error_handling.max_retries, 1);
    assert_eq!(entry.error_handling.retry_delay, 0);
    assert_eq!(entry.error_handling.on_error, OnErrorAction::Inherit);
    assert_eq!(entry.timeout, 60);
    assert_eq!(entry.before_delay, 0);
    assert!(!entry.enable_timeout);
    // Absent ids collapse to the nil sentinel.
    assert_eq!(entry.object_id, Uuid::nil());
    assert_eq!(entry.error_out_port_id, Uuid::nil());
    assert!(entry.control_in.is_none());
    assert!(entry.control_out.is_some());
}

#[test]
fn test_universal_app_connector_screens() {
    let process = parse_bot_xml(BOT_XML).unwrap();

    let connector = process
        .variables
        .iter()
        .find(|variable| variable.name == "DesktopApp")
        .unwrap();
    assert!(!connector.is_plain_variable());
    let app = connector.app_connector.as_ref().expect("UAC variable carries screens");
    assert_eq!(app.screens.len(), 1);

    let screen = &app.screens[0];
    assert_eq!(screen.name, "MainWindow");
    assert_eq!(screen.kind, ScreenKind::Windows);
    assert!(screen.is_windows());
    assert_eq!(screen.match_rules.len(), 2);

    assert!(screen.match_rules[0].enabled);
    match &screen.match_rules[0].kind {
        MatchRuleKind::StringComparer { comparer: Some(comparer) } => {
            assert_eq!(comparer.comparison_value, "Invoices");
            assert_eq!(comparer.compare_type, "Contains");
        }
        other => panic!("expected string comparer, got {other:?}"),
    }
    assert!(!screen.match_rules[1].enabled);
    assert!(matches!(&screen.match_rules[1].kind, MatchRuleKind::Index { index: 2 }));

    // Plain variables never carry the connector payload.
    let plain = process
        .variables
        .iter()
        .find(|variable| variable.name == "transactionId")
        .unwrap();
    assert!(plain.app_connector.is_none());
}

#[test]
fn test_parse_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invoice.ibot");
    let mut file = File::create(&path).unwrap();
    write!(file, "{}", BOT_XML).unwrap();

    let process = parse_bot_file(&path).unwrap();
    assert_eq!(process.activities.len(), 1);
}

#[test]
fn test_malformed_xml_is_an_error() {
    assert!(parse_bot_xml("<AutxProcess><ID>oops").is_err());
    assert!(parse_bot_xml("").is_err());
}

#[test]
fn test_missing_sections_default_to_empty() {
    let process = parse_bot_xml("<AutxProcess><Description>bare</Description></AutxProcess>").unwrap();
    assert_eq!(process.id, Uuid::nil());
    assert!(process.activities.is_empty());
    assert!(process.variables.is_empty());
    assert!(process.plugins.is_empty());
    assert!(process.user_plugins.is_empty());
}
