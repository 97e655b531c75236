//! Atomic batch committer
//!
//! A batch is written inside one transaction:
//! - the entity's table is ensured
//! - every row is mapped and inserted in source order
//! - a history row records the batch
//!
//! Any failure leaves the store exactly as it was. The outcome is always a
//! `CommitResult`; failures are carried inside it, never panicked.

use chrono::Utc;
use rusqlite::{ffi, params, params_from_iter, ErrorCode};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::mapping::map_row;
use crate::schema::Schema;
use crate::source::RowSet;
use crate::store::{create_table_sql, insert_sql, Store, StoreError, INSERT_HISTORY_SQL};

/// Outcome of one commit attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitResult {
    pub entity: String,
    pub success: bool,
    /// Rows durably written; zero unless `success`
    pub rows_committed: usize,
    pub batch_id: Option<Uuid>,
    pub error: Option<StoreError>,
}

impl CommitResult {
    fn committed(entity: &str, rows: usize, batch_id: Uuid) -> Self {
        Self {
            entity: entity.to_string(),
            success: true,
            rows_committed: rows,
            batch_id: Some(batch_id),
            error: None,
        }
    }

    fn failed(entity: &str, error: StoreError) -> Self {
        Self {
            entity: entity.to_string(),
            success: false,
            rows_committed: 0,
            batch_id: None,
            error: Some(error),
        }
    }
}

/// Writes every row of `rows` for `schema.entity`, all or nothing.
///
/// The row set is expected to be validated already; rows that still cannot
/// be mapped to the declared types abort the batch.
pub fn commit(store: &mut Store, schema: &Schema, rows: &RowSet) -> CommitResult {
    match commit_batch(store, schema, rows) {
        Ok(batch_id) => {
            info!(
                entity = %schema.entity,
                rows = rows.len(),
                batch_id = %batch_id,
                "batch committed"
            );
            CommitResult::committed(&schema.entity, rows.len(), batch_id)
        }
        Err(error) => {
            warn!(
                entity = %schema.entity,
                code = error.code(),
                error = %error,
                "batch rolled back"
            );
            CommitResult::failed(&schema.entity, error)
        }
    }
}

fn commit_batch(store: &mut Store, schema: &Schema, rows: &RowSet) -> Result<Uuid, StoreError> {
    let entity = schema.entity.as_str();
    let tx = store
        .transaction()
        .map_err(|e| StoreError::transaction_failure(entity, e.to_string()))?;

    tx.execute_batch(&create_table_sql(schema))
        .map_err(|e| StoreError::transaction_failure(entity, e.to_string()))?;

    {
        let mut stmt = tx
            .prepare(&insert_sql(schema))
            .map_err(|e| StoreError::transaction_failure(entity, e.to_string()))?;

        for (index, row) in rows.rows().iter().enumerate() {
            let number = index + 1;
            let values = map_row(schema, row).map_err(|reason| {
                StoreError::transaction_failure(entity, format!("row {}: {}", number, reason))
            })?;
            stmt.execute(params_from_iter(values.iter()))
                .map_err(|e| classify(entity, number, e))?;
        }
    }

    let batch_id = Uuid::new_v4();
    tx.execute(
        INSERT_HISTORY_SQL,
        params![
            batch_id.to_string(),
            entity,
            rows.len() as i64,
            Utc::now().to_rfc3339()
        ],
    )
    .map_err(|e| StoreError::transaction_failure(entity, e.to_string()))?;

    tx.commit()
        .map_err(|e| StoreError::transaction_failure(entity, e.to_string()))?;
    Ok(batch_id)
}

/// Primary-key and unique violations are duplicates; everything else,
/// including foreign-key rejections, is a transaction failure.
fn classify(entity: &str, row: usize, error: rusqlite::Error) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, detail)
            if failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE) =>
        {
            StoreError::DuplicateKey {
                entity: entity.to_string(),
                detail: format!(
                    "row {}: {}",
                    row,
                    detail.clone().unwrap_or_else(|| failure.to_string())
                ),
            }
        }
        _ => StoreError::transaction_failure(entity, format!("row {}: {}", row, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldType};

    fn customers() -> Schema {
        Schema::new(
            "customers",
            vec![
                FieldDef::key("id", FieldType::Integer),
                FieldDef::required("last_name", FieldType::Text),
                FieldDef::optional("first_name", FieldType::Text),
            ],
        )
    }

    fn rows(records: Vec<Vec<&str>>) -> RowSet {
        RowSet::from_records("customers.csv", &["id", "last_name", "first_name"], records).unwrap()
    }

    #[test]
    fn test_commit_writes_all_rows() {
        let mut store = Store::open_in_memory().unwrap();
        let result = commit(
            &mut store,
            &customers(),
            &rows(vec![vec!["1", "LOGAN", "JULIET"], vec!["2", "ARZT", ""]]),
        );

        assert!(result.success);
        assert_eq!(result.rows_committed, 2);
        assert!(result.error.is_none());
        assert_eq!(store.count("customers").unwrap(), 2);

        let history = store.history(Some("customers")).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(Some(history[0].batch_id), result.batch_id);
        assert_eq!(history[0].rows, 2);
    }

    #[test]
    fn test_unmappable_last_row_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        let result = commit(
            &mut store,
            &customers(),
            &rows(vec![
                vec!["1", "LOGAN", "JULIET"],
                vec!["2", "ARZT", "TERRELL"],
                vec!["abc", "ESPOSITA", "TRAVIS"],
            ]),
        );

        assert!(!result.success);
        assert_eq!(result.rows_committed, 0);
        let error = result.error.unwrap();
        assert_eq!(error.code(), "TABLOAD_TRANSACTION_FAILURE");
        assert!(error.to_string().contains("row 3"));
        assert_eq!(store.count("customers").unwrap(), 0);
        assert!(store.history(None).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_in_batch_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        let result = commit(
            &mut store,
            &customers(),
            &rows(vec![vec!["1", "LOGAN", ""], vec!["1", "ARZT", ""]]),
        );

        assert!(!result.success);
        assert_eq!(result.error.unwrap().code(), "TABLOAD_DUPLICATE_KEY");
        assert_eq!(store.count("customers").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_against_committed_rows() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(commit(&mut store, &customers(), &rows(vec![vec!["1", "LOGAN", ""]])).success);

        let result = commit(
            &mut store,
            &customers(),
            &rows(vec![vec!["2", "ARZT", ""], vec!["1", "LOGAN", ""]]),
        );
        assert!(!result.success);
        assert_eq!(result.error.unwrap().code(), "TABLOAD_DUPLICATE_KEY");
        assert_eq!(store.count("customers").unwrap(), 1);
        assert_eq!(store.history(None).unwrap().len(), 1);
    }

    #[test]
    fn test_foreign_key_rejection_is_transaction_failure() {
        let mut store = Store::open_in_memory().unwrap();
        let receipts = Schema::new(
            "receipts",
            vec![
                FieldDef::key("receipt_number", FieldType::Integer),
                FieldDef::required("customer_id", FieldType::Integer).references("customers", "id"),
            ],
        );
        store.create_table(&customers()).unwrap();

        let batch = RowSet::from_records(
            "receipts.csv",
            &["receipt_number", "customer_id"],
            vec![vec!["18129", "15"]],
        )
        .unwrap();
        let result = commit(&mut store, &receipts, &batch);

        assert!(!result.success);
        assert_eq!(result.error.unwrap().code(), "TABLOAD_TRANSACTION_FAILURE");
        assert_eq!(store.count("receipts").unwrap(), 0);
    }

    #[test]
    fn test_empty_batch_commits() {
        let mut store = Store::open_in_memory().unwrap();
        let result = commit(&mut store, &customers(), &rows(vec![]));
        assert!(result.success);
        assert_eq!(result.rows_committed, 0);
        assert!(store.table_exists("customers").unwrap());
    }
}
