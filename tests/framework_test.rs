use botlint::config::ConfigReader;
use botlint::model::{Activity, DesignItem, ExecutableItem, GlobalVariable, Process};
use botlint::result::RuleCheckStatus;
use botlint::rules::framework::FrameworkChecker;
use botlint::rules::RuleChecker;
use uuid::Uuid;

fn activity(name: &str, root_path: &str) -> Activity {
    Activity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        root_path: root_path.to_string(),
        ..Activity::default()
    }
}

fn named_item(name: &str) -> DesignItem {
    DesignItem::Executable(ExecutableItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        item_type: "AutxMethod".to_string(),
        ..ExecutableItem::default()
    })
}

fn variable(name: &str, root_path: &str, data_type: &str) -> GlobalVariable {
    GlobalVariable {
        id: Uuid::new_v4(),
        name: name.to_string(),
        root_path: root_path.to_string(),
        data_type: data_type.to_string(),
        ..GlobalVariable::default()
    }
}

/// A process with the whole framework skeleton in place.
fn framework_process() -> Process {
    let main = activity("Main", "Activities");
    let main_id = main.id;

    let mut get_workitem = activity("Get Workitem", "Activities/Framework");
    get_workitem.items.push(named_item("PickWorkitem"));
    let mut process_workitem = activity("Process Workitem", "Activities/Framework");
    process_workitem.items.push(named_item("UpdateWorkitem"));

    Process {
        startup_activity_id: main_id,
        activities: vec![
            main,
            activity("Initialize Workflow", "Activities/Framework"),
            get_workitem,
            process_workitem,
            activity("Exit Workflow", "Activities/Framework"),
        ],
        variables: vec![
            variable("WorkQueue", "Global Objects/Queue", "UTL.RPA.CONNECTORS.AutxQueue"),
            variable("TransactionId", "Global Objects/Variables", "AutxVariable"),
        ],
        ..Process::default()
    }
}

fn run(process: &Process) -> Vec<botlint::result::RuleCheckResult> {
    FrameworkChecker::new(ConfigReader::empty()).check_rules(process)
}

fn results_for<'a>(
    results: &'a [botlint::result::RuleCheckResult],
    rule_name: &str,
) -> Vec<&'a botlint::result::RuleCheckResult> {
    results.iter().filter(|result| result.rule.name == rule_name).collect()
}

#[test]
fn test_framework_skeleton_passes() {
    let results = run(&framework_process());
    for result in &results {
        assert_eq!(
            result.status,
            RuleCheckStatus::Pass,
            "rule {} failed: {}",
            result.rule.name,
            result.comments
        );
    }
}

#[test]
fn test_missing_startup_activity() {
    let mut process = framework_process();
    process.startup_activity_id = Uuid::new_v4();
    let results = run(&process);

    let startup = results_for(&results, "StartupActivity");
    assert_eq!(startup.len(), 1);
    assert_eq!(startup[0].status, RuleCheckStatus::Fail);
    assert_eq!(startup[0].source, "Activities");
}

#[test]
fn test_missing_framework_activity_is_reported_by_path() {
    let mut process = framework_process();
    process.activities.retain(|activity| activity.name != "Exit Workflow");
    let results = run(&process);

    let framework = results_for(&results, "FrameworkActivities");
    assert_eq!(framework.len(), 4, "one result per required activity");
    let missing: Vec<_> = framework
        .iter()
        .filter(|result| result.status != RuleCheckStatus::Pass)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].source, "Activities/Framework/Exit Workflow");
    assert_eq!(
        missing[0].comments,
        "Activity 'Activities/Framework/Exit Workflow' is missing."
    );
}

#[test]
fn test_activity_naming_convention() {
    let mut process = framework_process();
    process.activities.push(activity("ab", "Activities"));
    process.activities.push(activity("A1!", "Activities"));
    process.activities.push(activity("Process A", "Activities"));
    let results = run(&process);

    let naming = results_for(&results, "ActivityNamingConvention");
    let status_of = |name: &str| {
        naming
            .iter()
            .find(|result| result.source.ends_with(&format!("/{name}")))
            .unwrap_or_else(|| panic!("no naming result for {name}"))
            .status
    };

    assert_eq!(status_of("ab"), RuleCheckStatus::Warn, "below minimum length");
    assert_eq!(status_of("A1!"), RuleCheckStatus::Warn, "illegal character");
    assert_eq!(status_of("Process A"), RuleCheckStatus::Pass);
}

#[test]
fn test_repeated_character_run_fails_naming() {
    let mut process = framework_process();
    process.activities.push(activity("Loooad Data", "Activities"));
    let results = run(&process);

    let naming = results_for(&results, "ActivityNamingConvention");
    let repeated = naming
        .iter()
        .find(|result| result.source.ends_with("/Loooad Data"))
        .unwrap();
    assert_eq!(repeated.status, RuleCheckStatus::Warn);
}

#[test]
fn test_invalid_configured_regex_falls_back_to_builtin() {
    let config = ConfigReader::from_value(serde_json::json!({
        "GlobalVariableNamingConvention": { "NamingRegex": "[unclosed" }
    }));
    let mut process = framework_process();
    process.variables.push(variable("goodName", "Global Objects/Variables", "AutxVariable"));
    process.variables.push(variable("1badName", "Global Objects/Variables", "AutxVariable"));
    let results = FrameworkChecker::new(config).check_rules(&process);

    let naming = results_for(&results, "GlobalVariableNamingConvention");
    let status_of = |name: &str| {
        naming
            .iter()
            .find(|result| result.source.ends_with(&format!("/{name}")))
            .unwrap()
            .status
    };
    assert_eq!(status_of("goodName"), RuleCheckStatus::Pass);
    assert_eq!(status_of("1badName"), RuleCheckStatus::Warn);
}

#[test]
fn test_variable_placement_accepts_subfolders() {
    let mut process = framework_process();
    process
        .variables
        .push(variable("retryCount", "Global Objects/Variables/Counters", "AutxVariable"));
    process.variables.push(variable("strayVar", "Global Objects", "AutxVariable"));
    let results = run(&process);

    let placement = results_for(&results, "GlobalVariablePlacement");
    // Connectors are exempt from the placement rule.
    assert_eq!(placement.len(), 3);
    let stray = placement
        .iter()
        .find(|result| result.source.ends_with("/strayVar"))
        .unwrap();
    assert_eq!(stray.status, RuleCheckStatus::Warn);
    let nested = placement
        .iter()
        .find(|result| result.source.ends_with("/retryCount"))
        .unwrap();
    assert_eq!(nested.status, RuleCheckStatus::Pass);
}

#[test]
fn test_connector_grouping_uses_connector_type() {
    let mut process = framework_process();
    process.variables.push(variable(
        "MisplacedQueue",
        "Global Objects/Variables",
        "UTL.RPA.CONNECTORS.AutxQueue",
    ));
    let results = run(&process);

    let grouping = results_for(&results, "ConnectorGrouping");
    let misplaced = grouping
        .iter()
        .find(|result| result.source.ends_with("/MisplacedQueue"))
        .unwrap();
    assert_eq!(misplaced.status, RuleCheckStatus::Warn);
    assert!(
        misplaced.comments.contains("Global Objects/Queue"),
        "expected path should name the connector type: {}",
        misplaced.comments
    );
}

#[test]
fn test_component_count_limit() {
    let config = ConfigReader::from_value(serde_json::json!({
        "ExecutableComponentCount": { "MaxCount": 2 }
    }));
    let mut process = framework_process();
    let mut busy = activity("Busy Activity", "Activities");
    for i in 0..3 {
        busy.items.push(named_item(&format!("Step {i}")));
    }
    process.activities.push(busy);
    let results = FrameworkChecker::new(config).check_rules(&process);

    let counts = results_for(&results, "ExecutableComponentCount");
    let over = counts
        .iter()
        .find(|result| result.source.ends_with("/Busy Activity"))
        .unwrap();
    assert_eq!(over.status, RuleCheckStatus::Fail);
    assert!(over.comments.contains("exceeding the limit of 2"));
}

#[test]
fn test_missing_queue_connector() {
    let mut process = framework_process();
    process.variables.retain(|variable| variable.name != "WorkQueue");
    let results = run(&process);

    let queue = results_for(&results, "QueueUtilization");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].status, RuleCheckStatus::Fail);
    assert_eq!(queue[0].source, "Global Objects");
    assert_eq!(queue[0].comments, "No queue connector found for transaction tracking.");
}

#[test]
fn test_workitem_actions() {
    // Remove the PickWorkitem action but keep the activity.
    let mut process = framework_process();
    for activity in &mut process.activities {
        if activity.name == "Get Workitem" {
            activity.items.clear();
        }
    }
    let results = run(&process);

    let pick = results_for(&results, "PickWorkitem");
    assert_eq!(pick.len(), 1);
    assert_eq!(pick[0].status, RuleCheckStatus::Warn);
    assert_eq!(
        pick[0].comments,
        "'PickWorkitem' action is missing in the 'Get Workitem' activity."
    );

    let update = results_for(&results, "UpdateWorkitem");
    assert_eq!(update[0].status, RuleCheckStatus::Pass);

    // A missing framework activity is itself the finding.
    let mut process = framework_process();
    process.activities.retain(|activity| activity.name != "Process Workitem");
    let results = run(&process);
    let update = results_for(&results, "UpdateWorkitem");
    assert_eq!(update[0].status, RuleCheckStatus::Fail);
    assert_eq!(update[0].source, "Activities");
    assert_eq!(
        update[0].comments,
        "'Activities/Framework/Process Workitem' activity is missing."
    );
}
