use notely_core::store::{SqliteStore, DB_FILE};
use notely_core::{NoteQuery, OwnerId, StatusFilter};
use rusqlite::{params, Connection};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("notely_store_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn owner(id: &str) -> OwnerId {
    OwnerId::try_new(id).expect("owner id")
}

#[test]
fn schema_has_owner_and_group_indexes() {
    let dir = temp_dir("schema_has_owner_and_group_indexes");
    let store = SqliteStore::open(&dir).expect("open store");
    assert_eq!(store.path(), Some(dir.join(DB_FILE).as_path()));
    drop(store);

    let conn = Connection::open(dir.join(DB_FILE)).expect("open db");
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'notes' ORDER BY name")
        .expect("prepare");
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("query")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect");
    assert!(names.contains(&"by_author".to_string()));
    assert!(names.contains(&"by_author_and_group".to_string()));
}

#[test]
fn rows_without_completion_flag_read_as_incomplete() {
    let dir = temp_dir("rows_without_completion_flag_read_as_incomplete");
    drop(SqliteStore::open(&dir).expect("create schema"));
    {
        let conn = Connection::open(dir.join(DB_FILE)).expect("open db");
        conn.execute(
            "INSERT INTO notes(author_id, content, completed, note_group, created_at_ms) VALUES (?1, ?2, NULL, ?3, ?4)",
            params!["alice", "legacy", "", 5i64],
        )
        .expect("insert legacy row");
    }

    let store = SqliteStore::open(&dir).expect("reopen");
    let alice = owner("alice");
    let incomplete = store
        .query(
            &alice,
            &NoteQuery {
                status: StatusFilter::Incomplete,
                ..NoteQuery::default()
            },
        )
        .expect("query");
    assert_eq!(incomplete.len(), 1);
    assert!(!incomplete[0].completed);

    let ungrouped = store
        .query(&alice, &NoteQuery::new(None, Some("no_group")))
        .expect("query");
    assert_eq!(ungrouped.len(), 1);
    assert!(store.distinct_groups(&alice).expect("groups").is_empty());
}

#[test]
fn rename_group_only_touches_matching_owner_and_label() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    let alice = owner("alice");
    let bob = owner("bob");
    store.insert(&alice, "a", Some("work"), 1).unwrap();
    store.insert(&alice, "b", Some("work "), 2).unwrap();
    store.insert(&bob, "c", Some("work"), 3).unwrap();

    assert_eq!(store.rename_group(&alice, "work", "Work").unwrap(), 1);
    assert_eq!(store.distinct_groups(&alice).unwrap(), vec!["Work", "work "]);
    assert_eq!(store.distinct_groups(&bob).unwrap(), vec!["work"]);
}

#[test]
fn failed_rename_leaves_every_note_on_the_old_label() {
    let dir = temp_dir("failed_rename_leaves_every_note_on_the_old_label");
    let alice = owner("alice");
    {
        let mut store = SqliteStore::open(&dir).expect("open store");
        store.insert(&alice, "a", Some("work"), 1).unwrap();
        store.insert(&alice, "b", Some("work"), 2).unwrap();
        store.insert(&alice, "c", Some("work"), 3).unwrap();
    }
    {
        // The second relabel aborts after the first has already been applied.
        let conn = Connection::open(dir.join(DB_FILE)).expect("open db");
        conn.execute_batch(
            "CREATE TRIGGER fail_on_b BEFORE UPDATE OF note_group ON notes \
             WHEN OLD.content = 'b' BEGIN SELECT RAISE(ABORT, 'relabel refused'); END;",
        )
        .expect("create trigger");
    }

    let mut store = SqliteStore::open(&dir).expect("reopen");
    let err = store.rename_group(&alice, "work", "Work").unwrap_err();
    assert!(err.to_string().contains("relabel refused"), "{err}");

    assert_eq!(store.distinct_groups(&alice).unwrap(), vec!["work"]);
    let work = store
        .query(&alice, &NoteQuery::new(None, Some("work")))
        .unwrap();
    assert_eq!(work.len(), 3);
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    let id = store.insert(&owner("alice"), "x", None, 1).unwrap();
    assert!(store.delete(id).unwrap());
    assert!(!store.delete(id).unwrap());
    assert!(store.get(id).unwrap().is_none());
}
