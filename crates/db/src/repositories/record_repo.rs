//! Repository for the `records` table.

use datarules_core::entity::EntityKind;
use datarules_core::record::Fields;
use datarules_core::rules::{BulkOperation, BulkWriteResult};
use datarules_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::record::RecordRow;

/// Column list for `records` queries.
const COLUMNS: &str = "id, entity_type, data, created_at, updated_at";

/// Provides CRUD and bulk-write operations for records.
pub struct RecordRepo;

impl RecordRepo {
    /// List every record of a kind in insertion order.
    pub async fn list_by_entity_type(
        pool: &PgPool,
        kind: EntityKind,
    ) -> Result<Vec<RecordRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE entity_type = $1 ORDER BY id");
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Find a record by ID within a kind.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<RecordRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM records WHERE entity_type = $1 AND id = $2");
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a batch of records in one transaction, returning the new rows
    /// in input order.
    pub async fn create_many(
        pool: &PgPool,
        kind: EntityKind,
        records: &[Fields],
    ) -> Result<Vec<RecordRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO records (entity_type, data) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(records.len());
        for fields in records {
            let row = sqlx::query_as::<_, RecordRow>(&query)
                .bind(kind.as_str())
                .bind(Value::Object(fields.clone()))
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// Replace a record's fields wholesale.
    ///
    /// Returns `None` if no row with the given `id` exists for `kind`.
    pub async fn replace(
        pool: &PgPool,
        kind: EntityKind,
        id: DbId,
        fields: &Fields,
    ) -> Result<Option<RecordRow>, sqlx::Error> {
        let query = format!(
            "UPDATE records SET data = $3 \
             WHERE entity_type = $1 AND id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecordRow>(&query)
            .bind(kind.as_str())
            .bind(id)
            .bind(Value::Object(fields.clone()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a record. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, kind: EntityKind, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM records WHERE entity_type = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a per-kind batch of updates and deletes atomically.
    ///
    /// Updates remove the `unset` keys and then merge `set` over the stored
    /// object, so untouched fields keep their values. An empty batch does
    /// not open a transaction.
    pub async fn bulk_write(
        pool: &PgPool,
        kind: EntityKind,
        operations: &[BulkOperation],
    ) -> Result<BulkWriteResult, sqlx::Error> {
        let mut result = BulkWriteResult::default();
        if operations.is_empty() {
            return Ok(result);
        }

        let mut delete_ids: Vec<DbId> = Vec::new();
        let mut tx = pool.begin().await?;

        for op in operations {
            match op {
                BulkOperation::Update { id, set, unset } => {
                    let done = sqlx::query(
                        "UPDATE records SET data = (data - $3::text[]) || $4::jsonb \
                         WHERE entity_type = $1 AND id = $2",
                    )
                    .bind(kind.as_str())
                    .bind(*id)
                    .bind(unset)
                    .bind(Value::Object(set.clone()))
                    .execute(&mut *tx)
                    .await?;
                    result.modified_count += done.rows_affected();
                }
                BulkOperation::Delete { id } => delete_ids.push(*id),
            }
        }

        if !delete_ids.is_empty() {
            let done = sqlx::query("DELETE FROM records WHERE entity_type = $1 AND id = ANY($2)")
                .bind(kind.as_str())
                .bind(&delete_ids)
                .execute(&mut *tx)
                .await?;
            result.deleted_count = done.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!(
            entity_type = %kind,
            modified = result.modified_count,
            deleted = result.deleted_count,
            "Bulk write committed",
        );
        Ok(result)
    }
}
