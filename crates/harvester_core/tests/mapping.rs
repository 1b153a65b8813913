use harvester_core::{
    map_to_event, FieldMappingSpec, MappingDiagnostic, MappingMiss, RawRecord,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn record(value: Value) -> RawRecord {
    RawRecord::from_value(value).expect("object record")
}

fn review_task() -> Value {
    json!({
        "piid": "P1",
        "name": "Review",
        "startTime": "t0",
        "completionTime": "t1",
        "owner": "alice",
        "teamDisplayName": "HR",
        "state": "active",
        "data": {"variables": {"requisition": {"requester": "bob"}}}
    })
}

fn process_mining_spec(include: &[&str], paths: &[&str]) -> FieldMappingSpec {
    FieldMappingSpec {
        rename: [
            ("process_ID", "piid"),
            ("task_name", "name"),
            ("start_date", "startTime"),
            ("end_date", "completionTime"),
            ("owner", "owner"),
            ("team", "teamDisplayName"),
        ]
        .iter()
        .map(|(o, s)| (o.to_string(), s.to_string()))
        .collect(),
        include: include.iter().map(|s| s.to_string()).collect(),
        extra_variable_paths: paths.iter().map(|s| s.to_string()).collect(),
        export_exposed_variables: false,
    }
}

#[test]
fn review_task_maps_to_process_mining_event() {
    let mapping = process_mining_spec(&["state"], &["requisition.requester"])
        .compile()
        .unwrap();
    let mapped = map_to_event(record(review_task()), &mapping);

    assert_eq!(
        mapped.event.to_json(),
        json!({
            "process_ID": "P1",
            "task_name": "Review",
            "start_date": "t0",
            "end_date": "t1",
            "owner": "alice",
            "team": "HR",
            "state": "active",
            "tsk.requisition.requester": "bob"
        })
    );
    assert!(mapped.diagnostics.is_empty());
}

#[test]
fn missing_variable_path_defaults_to_empty_string() {
    let mapping = process_mining_spec(&["state"], &["requisition.missing"])
        .compile()
        .unwrap();
    let mapped = map_to_event(record(review_task()), &mapping);

    assert_eq!(
        mapped.event.get("tsk.requisition.missing"),
        Some(&json!(""))
    );
}

#[test]
fn extracted_keys_are_present_even_without_data_section() {
    let mapping = process_mining_spec(&[], &["a.b", "c"]).compile().unwrap();
    let mapped = map_to_event(record(json!({"piid": "P9"})), &mapping);

    assert_eq!(mapped.event.get("tsk.a.b"), Some(&json!("")));
    assert_eq!(mapped.event.get("tsk.c"), Some(&json!("")));
}

#[test]
fn missing_rename_source_is_reported_and_left_absent() {
    let mapping = process_mining_spec(&[], &[]).compile().unwrap();
    let mut raw = review_task();
    raw.as_object_mut().unwrap().remove("owner");
    let mapped = map_to_event(record(raw), &mapping);

    assert_eq!(mapped.event.get("owner"), None);
    assert_eq!(
        mapped.diagnostics,
        vec![MappingDiagnostic::Miss(MappingMiss {
            output_key: "owner".into(),
            source_key: "owner".into(),
        })]
    );
}

#[test]
fn renamed_source_is_not_included_again() {
    let mapping = process_mining_spec(&["piid", "name", "state"], &[])
        .compile()
        .unwrap();
    let mapped = map_to_event(record(review_task()), &mapping);

    assert_eq!(mapped.event.get("process_ID"), Some(&json!("P1")));
    assert_eq!(mapped.event.get("piid"), None);
    assert_eq!(mapped.event.get("name"), None);
    assert_eq!(mapped.event.get("state"), Some(&json!("active")));
}

#[test]
fn include_never_overwrites_a_renamed_key() {
    let spec = FieldMappingSpec {
        rename: vec![("state".into(), "status".into())],
        include: vec!["state".into()],
        extra_variable_paths: Vec::new(),
        export_exposed_variables: false,
    };
    let mapping = spec.compile().unwrap();
    let mapped = map_to_event(
        record(json!({"status": "Closed", "state": "STATE_FINISHED"})),
        &mapping,
    );

    assert_eq!(mapped.event.get("state"), Some(&json!("Closed")));
    assert_eq!(mapped.event.len(), 1);
}

#[test]
fn event_keys_are_exactly_renamed_included_exposed_and_extracted() {
    let spec = FieldMappingSpec {
        rename: vec![
            ("process_ID".into(), "piid".into()),
            ("gone".into(), "doesNotExist".into()),
        ],
        include: vec!["state".into(), "priority".into()],
        extra_variable_paths: vec!["requisition.requester".into(), "x.y".into()],
        export_exposed_variables: true,
    };
    let mut raw = review_task();
    raw["processData"] = json!({"businessData": [
        {"name": "amount", "value": 12},
        {"name": "region", "value": "EU"}
    ]});
    let mapped = map_to_event(record(raw), &spec.compile().unwrap());

    let keys: Vec<&str> = mapped.event.keys().collect();
    assert_eq!(
        keys,
        vec![
            "process_ID",
            "state",
            "trkd.amount",
            "trkd.region",
            "tsk.requisition.requester",
            "tsk.x.y"
        ]
    );
    assert_eq!(mapped.event.get("trkd.amount"), Some(&json!(12)));
}

#[test]
fn exposed_variables_are_skipped_unless_enabled() {
    let mut raw = review_task();
    raw["processData"] = json!({"businessData": [{"name": "amount", "value": 12}]});
    let mapping = process_mining_spec(&[], &[]).compile().unwrap();
    let mapped = map_to_event(record(raw), &mapping);

    assert_eq!(mapped.event.get("trkd.amount"), None);
}

#[test]
fn malformed_business_data_fails_closed() {
    let mut spec = process_mining_spec(&[], &[]);
    spec.export_exposed_variables = true;
    let mapping = spec.compile().unwrap();

    for bad in [
        json!({"businessData": {"name": "amount"}}),
        json!({"businessData": [{"name": "ok", "value": 1}, {"value": 2}]}),
        json!({"somethingElse": []}),
    ] {
        let mut raw = review_task();
        raw["processData"] = bad;
        let mapped = map_to_event(record(raw), &mapping);

        assert!(mapped.event.keys().all(|k| !k.starts_with("trkd.")));
        assert!(matches!(
            mapped.diagnostics.as_slice(),
            [MappingDiagnostic::MalformedBusinessData(_)]
        ));
    }
}

#[test]
fn mapping_is_idempotent() {
    let mut spec = process_mining_spec(&["state"], &["requisition.requester", "nope"]);
    spec.export_exposed_variables = true;
    let mapping = spec.compile().unwrap();

    let first = map_to_event(record(review_task()), &mapping);
    let second = map_to_event(record(review_task()), &mapping);

    assert_eq!(
        serde_json::to_string(&first.event).unwrap(),
        serde_json::to_string(&second.event).unwrap()
    );
}

#[test]
fn baw_default_mapping_covers_process_mining_columns() {
    let spec = FieldMappingSpec::baw_default();
    let outputs: Vec<&str> = spec.rename.iter().map(|(o, _)| o.as_str()).collect();
    assert_eq!(
        outputs,
        vec!["process_ID", "task_name", "start_date", "end_date", "owner", "team"]
    );
    assert!(spec.include.iter().any(|k| k == "tkiid"));
    assert!(!spec.export_exposed_variables);
}
