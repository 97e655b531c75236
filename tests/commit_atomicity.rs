//! Commit Atomicity Tests
//!
//! - A batch is committed entirely or not at all
//! - Store-side key conflicts surface as DuplicateKey
//! - Committed records read back equal to their source rows, in insertion order
//! - Committed batches survive reopening a file store

use chrono::NaiveDate;
use tabload::commit::commit;
use tabload::schema::{Dataset, FieldDef, FieldType, Schema};
use tabload::source::RowSet;
use tabload::store::Store;
use tabload::value::Value;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn goods() -> Schema {
    Schema::new(
        "goods",
        vec![
            FieldDef::key("id", FieldType::Text),
            FieldDef::required("flavor", FieldType::Text),
            FieldDef::required("food", FieldType::Text),
            FieldDef::required("price", FieldType::Decimal),
        ],
    )
}

fn goods_rows(records: Vec<Vec<&str>>) -> RowSet {
    RowSet::from_records("goods.csv", &["id", "flavor", "food", "price"], records).unwrap()
}

// =============================================================================
// All-or-Nothing Tests
// =============================================================================

/// Failure on the last of N rows leaves zero records.
#[test]
fn test_failure_on_last_row_commits_nothing() {
    for n in 1..=10 {
        let mut store = Store::open_in_memory().unwrap();

        let ids: Vec<String> = (0..n).map(|i| format!("{}-CO", i)).collect();
        let mut records: Vec<Vec<&str>> = ids
            .iter()
            .map(|id| vec![id.as_str(), "Chocolate", "Cake", "8.95"])
            .collect();
        records.push(vec!["bad", "Chocolate", "Cake", "expensive"]);

        let result = commit(&mut store, &goods(), &goods_rows(records));

        assert!(!result.success, "batch of {} should fail", n + 1);
        assert_eq!(result.rows_committed, 0);
        assert_eq!(store.count("goods").unwrap(), 0);
        assert!(store.history(Some("goods")).unwrap().is_empty());
    }
}

/// A key colliding with a committed record rolls back the whole batch.
#[test]
fn test_duplicate_key_against_store() {
    let mut store = Store::open_in_memory().unwrap();
    let first = commit(
        &mut store,
        &goods(),
        &goods_rows(vec![vec!["45-CO", "Chocolate", "Cake", "8.95"]]),
    );
    assert!(first.success);

    let second = commit(
        &mut store,
        &goods(),
        &goods_rows(vec![
            vec!["46-CH", "Cherry", "Tart", "3.25"],
            vec!["45-CO", "Chocolate", "Cake", "8.95"],
        ]),
    );

    assert!(!second.success);
    assert_eq!(second.error.as_ref().unwrap().code(), "TABLOAD_DUPLICATE_KEY");
    assert_eq!(store.count("goods").unwrap(), 1);
}

/// Children referencing missing parents are rejected by the store.
#[test]
fn test_foreign_key_enforced() {
    let registry = Dataset::Bakery.registry().unwrap();
    let mut store = Store::open_in_memory().unwrap();
    store.create_tables(&registry).unwrap();

    let customers = RowSet::from_records(
        "customers.csv",
        &["id", "last_name", "first_name"],
        vec![vec!["1", "LOGAN", "JULIET"]],
    )
    .unwrap();
    assert!(commit(&mut store, registry.lookup("customers").unwrap(), &customers).success);

    let receipts = RowSet::from_records(
        "receipts.csv",
        &["receipt_number", "date", "customer_id"],
        vec![vec!["18129", "28-Oct-2007", "1"], vec!["51991", "28-Oct-2007", "99"]],
    )
    .unwrap();
    let result = commit(&mut store, registry.lookup("receipts").unwrap(), &receipts);

    assert!(!result.success);
    assert_eq!(result.error.unwrap().code(), "TABLOAD_TRANSACTION_FAILURE");
    assert_eq!(store.count("receipts").unwrap(), 0);
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

/// Read-back equals the source after type coercion.
#[test]
fn test_round_trip() {
    let registry = Dataset::Bakery.registry().unwrap();
    let schema = registry.lookup("receipts").unwrap();
    let mut store = Store::open_in_memory().unwrap();
    store.create_tables(&registry).unwrap();

    let customers = RowSet::from_records(
        "customers.csv",
        &["id", "last_name", "first_name"],
        vec![vec!["15", "LOGAN", "JULIET"]],
    )
    .unwrap();
    assert!(commit(&mut store, registry.lookup("customers").unwrap(), &customers).success);

    let rows = RowSet::from_records(
        "receipts.csv",
        &["receipt_number", "date", "customer_id"],
        vec![vec!["18129", "28-Oct-2007", "15"], vec!["0051991", "2007-10-29", "15"]],
    )
    .unwrap();
    assert!(commit(&mut store, schema, &rows).success);

    let records = store.fetch_records(schema).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["receipt_number"], Value::Integer(18129));
    assert_eq!(
        records[0]["date"],
        Value::Date(NaiveDate::from_ymd_opt(2007, 10, 28).unwrap())
    );
    assert_eq!(records[1]["receipt_number"], Value::Integer(51991));
    assert_eq!(records[1]["customer_id"], Value::Integer(15));
}

/// Integer keys do not reorder read-back, within or across batches.
#[test]
fn test_read_back_keeps_insertion_order() {
    let registry = Dataset::Bakery.registry().unwrap();
    let schema = registry.lookup("customers").unwrap();
    let mut store = Store::open_in_memory().unwrap();

    let batch = |ids: &[&str]| {
        RowSet::from_records(
            "customers.csv",
            &["id", "last_name", "first_name"],
            ids.iter().map(|id| vec![*id, "LAST", "FIRST"]),
        )
        .unwrap()
    };
    assert!(commit(&mut store, schema, &batch(&["5", "1"])).success);
    assert!(commit(&mut store, schema, &batch(&["3", "2"])).success);

    let ids: Vec<Value> = store
        .fetch_records(schema)
        .unwrap()
        .into_iter()
        .map(|record| record["id"].clone())
        .collect();
    assert_eq!(
        ids,
        vec![Value::Integer(5), Value::Integer(1), Value::Integer(3), Value::Integer(2)]
    );
}

/// Committed batches persist in a file store.
#[test]
fn test_commit_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bakery.db");

    let batch_id = {
        let mut store = Store::open_path(&path).unwrap();
        let result = commit(
            &mut store,
            &goods(),
            &goods_rows(vec![vec!["45-CO", "Chocolate", "Cake", "8.95"]]),
        );
        result.batch_id.unwrap()
    };

    let store = Store::open_path(&path).unwrap();
    assert_eq!(store.count("goods").unwrap(), 1);
    let history = store.history(None).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].batch_id, batch_id);
    assert_eq!(history[0].entity, "goods");
}
