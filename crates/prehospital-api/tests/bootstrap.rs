use prehospital_api::bootstrap::ensure_admin_with;
use prehospital_api::config::BootstrapAdmin;
use prehospital_auth::password::{hash_password_with, verify_password};
use prehospital_core::models::user::Role;
use prehospital_storage::{activity, db, users};

fn admin() -> BootstrapAdmin {
    BootstrapAdmin {
        username: "chief".to_string(),
        password: "change-me-now".to_string(),
    }
}

fn fast_hash(password: &str) -> String {
    hash_password_with(password, 1_000)
}

#[test]
fn creates_missing_admin_once() {
    let conn = db::open_memory_database().unwrap();
    let now = jiff::Timestamp::now();

    let created = ensure_admin_with(&conn, &admin(), now, fast_hash).unwrap().unwrap();
    assert_eq!(created.role, Role::Admin);

    let stored = users::find_credentials(&conn, "chief").unwrap().unwrap();
    assert!(verify_password("change-me-now", &stored.password_hash).unwrap());

    assert!(ensure_admin_with(&conn, &admin(), now, fast_hash).unwrap().is_none());

    let id = created.id.to_string();
    let log = activity::list_recent(&conn, Some(("user", id.as_str())), 10).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "user_create");
}
