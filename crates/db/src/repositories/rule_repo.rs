//! Repository for the `rules` table.

use datarules_core::rules::RuleScope;
use datarules_core::types::DbId;
use sqlx::PgPool;

use crate::models::rule::{RuleColumns, RuleRow, UpdateRuleState};

/// Column list for `rules` queries.
const COLUMNS: &str = "id, entity_type, name, description, enabled, priority, \
     conditions, actions, extra, created_at, updated_at";

/// Provides CRUD operations for rules.
pub struct RuleRepo;

impl RuleRepo {
    /// List rules in stored order, optionally restricted to one scope.
    pub async fn list(
        pool: &PgPool,
        scope: Option<RuleScope>,
    ) -> Result<Vec<RuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rules \
             WHERE ($1::text IS NULL OR entity_type = $1) \
             ORDER BY id"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(scope.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Every rule in stored order. The engine's priority sort is stable, so
    /// this order breaks priority ties.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RuleRow>, sqlx::Error> {
        Self::list(pool, None).await
    }

    /// Find a rule by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rules WHERE id = $1");
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a rule, returning the created row.
    pub async fn create(pool: &PgPool, input: &RuleColumns) -> Result<RuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO rules \
                (entity_type, name, description, enabled, priority, conditions, actions, extra) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(&input.entity_type)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.enabled)
            .bind(input.priority)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(&input.extra)
            .fetch_one(pool)
            .await
    }

    /// Insert several rules atomically, optionally clearing existing rules
    /// first. Returns the created rows in input order.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[RuleColumns],
        replace_existing: bool,
    ) -> Result<Vec<RuleRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO rules \
                (entity_type, name, description, enabled, priority, conditions, actions, extra) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;

        if replace_existing {
            sqlx::query("DELETE FROM rules").execute(&mut *tx).await?;
        }

        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            let row = sqlx::query_as::<_, RuleRow>(&query)
                .bind(&input.entity_type)
                .bind(&input.name)
                .bind(&input.description)
                .bind(input.enabled)
                .bind(input.priority)
                .bind(&input.conditions)
                .bind(&input.actions)
                .bind(&input.extra)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    /// Replace a rule document.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        input: &RuleColumns,
    ) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET \
                entity_type = $2, name = $3, description = $4, enabled = $5, \
                priority = $6, conditions = $7, actions = $8, extra = $9 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .bind(&input.entity_type)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.enabled)
            .bind(input.priority)
            .bind(&input.conditions)
            .bind(&input.actions)
            .bind(&input.extra)
            .fetch_optional(pool)
            .await
    }

    /// Update `enabled` / `priority`. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_state(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRuleState,
    ) -> Result<Option<RuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE rules SET \
                enabled = COALESCE($2, enabled), \
                priority = COALESCE($3, priority) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .bind(input.enabled)
            .bind(input.priority)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
