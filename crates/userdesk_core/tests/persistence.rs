use rusqlite::Connection;
use userdesk_core::db::open_db_in_memory;
use userdesk_core::{
    PersistenceAdapter, PersistenceError, RecordStoreState, Role, SlotStore, SqliteSlotStore,
    StoreError, UserId, UserRecord, UserStore, COUNTER_SLOT, USERS_SLOT,
};

fn adapter(conn: &Connection) -> PersistenceAdapter<SqliteSlotStore<'_>> {
    PersistenceAdapter::new(SqliteSlotStore::new(conn))
}

fn write_raw(conn: &Connection, entries: &[(&str, &str)]) {
    SqliteSlotStore::new(conn).write_slots(entries).unwrap();
}

#[test]
fn load_without_prior_state_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let state = adapter(&conn).load().unwrap();
    assert_eq!(state, RecordStoreState::default());
    assert_eq!(state.next_id, 1);
}

#[test]
fn save_then_load_roundtrips_single_record() {
    let conn = open_db_in_memory().unwrap();
    let state = RecordStoreState {
        records: vec![UserRecord {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            role: Role::Admin,
            is_active: true,
        }],
        next_id: 2,
    };

    adapter(&conn).save(&state).unwrap();
    assert_eq!(adapter(&conn).load().unwrap(), state);
}

#[test]
fn roundtrip_keeps_counter_past_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let mut store = UserStore::new();
    store.create("Ann", "ann@x.com", Role::Admin).unwrap();
    let bob = store.create("Bob", "bob@x.com", Role::Guest).unwrap();
    store.toggle_active(1).unwrap();
    store.delete(bob.id);

    adapter(&conn).save(store.state()).unwrap();
    let loaded = adapter(&conn).load().unwrap();

    assert_eq!(&loaded, store.state());
    assert_eq!(loaded.next_id, 3);
}

#[test]
fn slots_use_expected_wire_layout() {
    let conn = open_db_in_memory().unwrap();
    let mut store = UserStore::new();
    store.create("Ann", "ann@x.com", Role::Admin).unwrap();
    adapter(&conn).save(store.state()).unwrap();

    let slots = SqliteSlotStore::new(&conn);
    let users = slots.read_slot(USERS_SLOT).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&users).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": 1,
            "name": "Ann",
            "email": "ann@x.com",
            "role": "admin",
            "isActive": true
        }])
    );
    assert_eq!(slots.read_slot(COUNTER_SLOT).unwrap().as_deref(), Some("2"));
}

#[test]
fn malformed_records_are_corrupt() {
    let conn = open_db_in_memory().unwrap();
    write_raw(&conn, &[(USERS_SLOT, "{not json"), (COUNTER_SLOT, "2")]);
    assert!(matches!(
        adapter(&conn).load(),
        Err(PersistenceError::CorruptState(_))
    ));
}

#[test]
fn unknown_role_is_corrupt() {
    let conn = open_db_in_memory().unwrap();
    write_raw(
        &conn,
        &[(
            USERS_SLOT,
            r#"[{"id":1,"name":"Ann","email":"ann@x.com","role":"owner","isActive":true}]"#,
        )],
    );
    assert!(matches!(
        adapter(&conn).load(),
        Err(PersistenceError::CorruptState(_))
    ));
}

#[test]
fn non_integer_counter_is_corrupt() {
    let conn = open_db_in_memory().unwrap();
    write_raw(&conn, &[(USERS_SLOT, "[]"), (COUNTER_SLOT, "two")]);
    let err = adapter(&conn).load().unwrap_err();
    assert!(matches!(err, PersistenceError::CorruptState(_)));
    assert!(err.to_string().contains(COUNTER_SLOT));
}

#[test]
fn counter_not_above_stored_ids_is_corrupt() {
    let conn = open_db_in_memory().unwrap();
    write_raw(
        &conn,
        &[
            (
                USERS_SLOT,
                r#"[{"id":3,"name":"Ann","email":"ann@x.com","role":"user","isActive":true}]"#,
            ),
            (COUNTER_SLOT, "3"),
        ],
    );
    assert!(matches!(
        adapter(&conn).load(),
        Err(PersistenceError::CorruptState(_))
    ));
}

#[test]
fn duplicate_ids_are_corrupt() {
    let conn = open_db_in_memory().unwrap();
    write_raw(
        &conn,
        &[
            (
                USERS_SLOT,
                r#"[
                    {"id":1,"name":"Ann","email":"ann@x.com","role":"user","isActive":true},
                    {"id":1,"name":"Bob","email":"bob@x.com","role":"user","isActive":false}
                ]"#,
            ),
            (COUNTER_SLOT, "5"),
        ],
    );
    let err = adapter(&conn).load().unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn missing_counter_is_derived_from_highest_id() {
    let conn = open_db_in_memory().unwrap();
    write_raw(
        &conn,
        &[(
            USERS_SLOT,
            r#"[{"id":4,"name":"Ann","email":"ann@x.com","role":"guest","isActive":false}]"#,
        )],
    );
    let state = adapter(&conn).load().unwrap();
    assert_eq!(state.records.len(), 1);
    assert_eq!(state.next_id, 5);
}

#[test]
fn counter_without_records_is_kept() {
    let conn = open_db_in_memory().unwrap();
    write_raw(&conn, &[(COUNTER_SLOT, "9")]);
    let state = adapter(&conn).load().unwrap();
    assert!(state.records.is_empty());
    assert_eq!(state.next_id, 9);
}

#[test]
fn read_only_medium_reports_write_failed_and_keeps_old_slots() {
    let conn = open_db_in_memory().unwrap();
    let mut store = UserStore::new();
    store.create("Ann", "ann@x.com", Role::User).unwrap();
    adapter(&conn).save(store.state()).unwrap();

    store.create("Bob", "bob@x.com", Role::User).unwrap();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();
    let err = adapter(&conn).save(store.state()).unwrap_err();
    assert!(matches!(err, PersistenceError::WriteFailed(_)));

    conn.execute_batch("PRAGMA query_only = OFF;").unwrap();
    let loaded = adapter(&conn).load().unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.next_id, 2);
}

#[test]
fn missing_table_reports_read_failed() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE kv_slots;").unwrap();
    assert!(matches!(
        adapter(&conn).load(),
        Err(PersistenceError::ReadFailed(_))
    ));
}

#[test]
fn highest_possible_id_without_counter_is_corrupt() {
    let conn = open_db_in_memory().unwrap();
    let users = format!(
        r#"[{{"id":{},"name":"Ann","email":"ann@x.com","role":"user","isActive":true}}]"#,
        UserId::MAX
    );
    write_raw(&conn, &[(USERS_SLOT, users.as_str())]);

    let err = adapter(&conn).load().unwrap_err();
    assert!(matches!(err, PersistenceError::CorruptState(_)));
    assert!(err.to_string().contains(COUNTER_SLOT));
}

#[test]
fn maximal_counter_restores_but_refuses_new_ids() {
    let conn = open_db_in_memory().unwrap();
    let counter = UserId::MAX.to_string();
    write_raw(&conn, &[(USERS_SLOT, "[]"), (COUNTER_SLOT, counter.as_str())]);

    let state = adapter(&conn).load().unwrap();
    assert_eq!(state.next_id, UserId::MAX);

    let mut store = UserStore::from_state(state);
    let err = store.create("Ann", "ann@x.com", Role::User).unwrap_err();
    assert_eq!(err, StoreError::IdsExhausted);
    assert!(store.is_empty());
    assert_eq!(store.next_id(), UserId::MAX);
}

#[test]
fn empty_slot_values_count_as_absent() {
    let conn = open_db_in_memory().unwrap();
    write_raw(&conn, &[(USERS_SLOT, ""), (COUNTER_SLOT, "")]);
    assert_eq!(adapter(&conn).load().unwrap(), RecordStoreState::default());
}

#[test]
fn empty_counter_with_records_is_derived() {
    let conn = open_db_in_memory().unwrap();
    write_raw(
        &conn,
        &[
            (
                USERS_SLOT,
                r#"[{"id":2,"name":"Ann","email":"ann@x.com","role":"admin","isActive":true}]"#,
            ),
            (COUNTER_SLOT, ""),
        ],
    );
    let state = adapter(&conn).load().unwrap();
    assert_eq!(state.records.len(), 1);
    assert_eq!(state.next_id, 3);
}
