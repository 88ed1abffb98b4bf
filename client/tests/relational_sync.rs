mod common;

use serde_json::json;

use tether_client::{ChildResolution, IncomingMessage, Session, SessionConfig};

use common::{id, new_session, new_session_with};

fn dispatch(session: &mut Session, text: &str) {
    session.dispatch_incoming(IncomingMessage::decode(text).unwrap());
}

fn session_with_group() -> (Session, common::SentEvents) {
    let (mut session, sent) = new_session();
    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Group", "widgetProperties": ["fields"], "fields": ["11", "12", "13"]},
                "11": {"id": "11", "objectType": "Field"},
                "12": {"id": "12", "objectType": "Field"},
                "13": {"id": "13", "objectType": "Field"}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );
    (session, sent)
}

#[test]
fn initial_relation_creates_children_owned_by_the_referrer() {
    let (session, sent) = session_with_group();

    for child in ["11", "12", "13"] {
        assert!(session.has_adapter(&id(child)));
        assert_eq!(session.adapter_owner(&id(child)), Some(id("10")));
        let adapter = session.get_adapter(&id(child)).unwrap();
        assert_eq!(adapter.widget().parent(), Some(&id("10")));
    }
    let group = session.get_adapter(&id("10")).unwrap();
    assert_eq!(
        group.relational_references("fields"),
        [id("11"), id("12"), id("13")]
    );
    assert!(sent.borrow().is_empty());
}

#[test]
fn relation_diff_destroys_dropped_and_creates_added_children() {
    let (mut session, sent) = session_with_group();

    dispatch(
        &mut session,
        r#"{
            "adapterData": {"14": {"id": "14", "objectType": "Field"}},
            "events": [{"target": "10", "type": "property", "properties": {"fields": ["12", "14"]}}]
        }"#,
    );

    assert!(!session.has_adapter(&id("11")));
    assert!(!session.has_adapter(&id("13")));
    assert!(session.has_adapter(&id("12")));
    assert!(session.has_adapter(&id("14")));
    assert_eq!(session.adapter_owner(&id("14")), Some(id("10")));

    let group = session.get_adapter(&id("10")).unwrap();
    assert_eq!(group.relational_references("fields"), [id("12"), id("14")]);
    assert_eq!(
        group.widget().property("fields"),
        Some(&json!(["12", "14"]))
    );
    // Everything here mirrors server state; nothing travels back.
    assert!(sent.borrow().is_empty());
}

#[test]
fn back_reference_to_the_event_target_resolves() {
    let (mut session, sent) = new_session();

    // "11" is created while "10" is taken out of the registry for its
    // own sync; its back-reference must still resolve to the live "10"
    // instead of falling through to the consumed descriptor cache.
    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Group", "widgetProperties": ["fields"], "fields": ["11"]},
                "11": {"id": "11", "objectType": "Field", "widgetProperties": ["buddy"], "buddy": "10"}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );

    assert!(session.has_adapter(&id("10")));
    assert!(session.has_adapter(&id("11")));
    let field = session.get_adapter(&id("11")).unwrap();
    assert_eq!(field.relational_references("buddy"), [id("10")]);
    assert_eq!(field.widget().property("buddy"), Some(&json!("10")));
    assert!(sent.borrow().is_empty());
}

#[test]
fn relation_diff_spares_children_owned_elsewhere() {
    let (mut session, _sent) = new_session();
    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Group", "widgetProperties": ["fields"], "fields": ["30"]},
                "30": {"id": "30", "objectType": "Field", "owner": "1"}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );
    assert_eq!(session.adapter_owner(&id("30")), Some(id("1")));

    dispatch(
        &mut session,
        r#"{"events": [{"target": "10", "type": "property", "properties": {"fields": []}}]}"#,
    );

    // Dropped from the relation but owned by the root, so it lives on.
    assert!(session.has_adapter(&id("30")));
    let group = session.get_adapter(&id("10")).unwrap();
    assert!(group.relational_references("fields").is_empty());
}

#[test]
fn unresolvable_reference_is_dropped_from_the_relation() {
    let (mut session, _sent) = session_with_group();

    // "99" has no adapter data anywhere; the rest of the relation still
    // syncs.
    dispatch(
        &mut session,
        r#"{"events": [{"target": "10", "type": "property", "properties": {"fields": ["12", "99"]}}]}"#,
    );

    assert!(!session.has_adapter(&id("99")));
    let group = session.get_adapter(&id("10")).unwrap();
    assert_eq!(group.relational_references("fields"), [id("12")]);
    assert_eq!(group.widget().property("fields"), Some(&json!(["12"])));
}

#[test]
fn scalar_relation_keeps_its_shape() {
    let (mut session, _sent) = new_session();
    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Form", "widgetProperties": ["rootGroupBox"], "rootGroupBox": "11"},
                "11": {"id": "11", "objectType": "GroupBox"}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );

    let form = session.get_adapter(&id("10")).unwrap();
    assert_eq!(form.widget().property("rootGroupBox"), Some(&json!("11")));
    assert_eq!(form.relational_references("rootGroupBox"), [id("11")]);

    // Null clears the relation and destroys the owned child.
    dispatch(
        &mut session,
        r#"{"events": [{"target": "10", "type": "property", "properties": {"rootGroupBox": null}}]}"#,
    );
    assert!(!session.has_adapter(&id("11")));
    let form = session.get_adapter(&id("10")).unwrap();
    assert_eq!(form.widget().property("rootGroupBox"), Some(&json!(null)));
}

#[test]
fn inline_child_definitions_resolve_under_the_local_strategy() {
    let config = SessionConfig {
        child_resolution: ChildResolution::LocalInline,
        ..SessionConfig::default()
    };
    let (mut session, _sent) = new_session_with(config, Default::default());

    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Group", "widgetProperties": ["fields"],
                       "fields": [{"id": "11", "objectType": "Field", "label": "a"}]}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );

    assert!(session.has_adapter(&id("11")));
    assert_eq!(session.adapter_owner(&id("11")), Some(id("10")));
    assert_eq!(
        session.get_adapter(&id("11")).unwrap().widget().property("label"),
        Some(&json!("a"))
    );
}

#[test]
fn inline_child_definitions_are_rejected_by_default() {
    let (mut session, _sent) = new_session();

    dispatch(
        &mut session,
        r#"{
            "adapterData": {
                "10": {"id": "10", "objectType": "Group", "widgetProperties": ["fields"],
                       "fields": [{"id": "11", "objectType": "Field"}]}
            },
            "events": [{"target": "10", "type": "property", "properties": {}}]
        }"#,
    );

    // The malformed property is skipped; the group itself still exists.
    assert!(session.has_adapter(&id("10")));
    assert!(!session.has_adapter(&id("11")));
}
