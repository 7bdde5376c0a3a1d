use prehospital_storage::db;

mod common;

#[test]
fn schema_version_is_latest() {
    let conn = common::memory_db();
    assert_eq!(db::current_version(&conn), db::latest_version());
    assert_eq!(db::latest_version(), 1);
}

#[test]
fn migrations_are_idempotent() {
    let conn = common::memory_db();
    db::run_migrations(&conn).unwrap();
    assert_eq!(db::current_version(&conn), 1);
}

#[test]
fn all_tables_exist() {
    let conn = common::memory_db();
    for table in [
        "users",
        "prehospital_forms",
        "injuries",
        "rate_limits",
        "activity_log",
    ] {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(found, 1, "missing table {table}");
    }
}

#[test]
fn foreign_keys_enabled() {
    let conn = common::memory_db();
    let fk: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}
