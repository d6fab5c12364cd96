use prontuario_store::migrate::latest_version;
use prontuario_store::Store;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    assert_eq!(store.schema_version().expect("version"), 0);
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    let version: i64 = store
        .connection()
        .query_row(
            "SELECT version FROM prontuario_schema LIMIT 1;",
            [],
            |row| row.get(0),
        )
        .expect("schema version");
    assert_eq!(version, latest_version());
    assert_eq!(store.schema_version().expect("version"), latest_version());
}

#[test]
fn newer_database_is_refused() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
        .connection()
        .execute("UPDATE prontuario_schema SET version = 99;", [])
        .expect("bump version");
    assert!(store.migrate().is_err());
}
