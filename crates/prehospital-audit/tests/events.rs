use prehospital_audit::actions;
use prehospital_audit::events::AuditEvent;
use prehospital_storage::{activity, db};
use serde_json::json;

fn now() -> jiff::Timestamp {
    "2026-10-18T08:30:00Z".parse().unwrap()
}

#[test]
fn recorded_event_lands_in_activity_log() {
    let conn = db::open_memory_database().unwrap();

    let id = AuditEvent::new(actions::LOGIN_FAILED, actions::RESOURCE_SESSION)
        .with_details(json!({ "username": "medic" }))
        .record(&conn, now())
        .unwrap();

    let entries = activity::list_recent(&conn, None, 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert_eq!(entries[0].action, "login_failed");
    assert_eq!(entries[0].user_id, None);
    assert_eq!(entries[0].details, Some(json!({ "username": "medic" })));
    assert_eq!(entries[0].created_at, now());
}

#[test]
fn resource_filter_finds_form_events() {
    let conn = db::open_memory_database().unwrap();

    AuditEvent::new(actions::FORM_DELETE, actions::RESOURCE_FORM)
        .resource(41)
        .record(&conn, now())
        .unwrap();
    AuditEvent::new(actions::LOGIN_FAILED, actions::RESOURCE_SESSION)
        .record(&conn, now())
        .unwrap();

    let entries = activity::list_recent(&conn, Some(("form", "41")), 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "form_delete");
    assert_eq!(entries[0].resource_id.as_deref(), Some("41"));
}

#[test]
fn builder_sets_every_field() {
    let event = AuditEvent::new("form_update", "form")
        .resource("PHC-20261018-ABC123")
        .by(7)
        .with_details(json!({ "injuries": 2 }));

    assert_eq!(event.resource_id.as_deref(), Some("PHC-20261018-ABC123"));
    assert_eq!(event.user_id, Some(7));
    assert_eq!(event.details, Some(json!({ "injuries": 2 })));
}
