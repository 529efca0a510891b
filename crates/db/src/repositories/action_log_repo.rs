//! Repository for the `action_logs` table.

use sqlx::PgPool;

use contracts_core::types::{DbId, Timestamp};

use crate::models::action_log::{ActionLog, ActionLogQuery, CreateActionLog};

const COLUMNS: &str = "id, user_id, username, action, target_type, target_id, \
                       details, ip_address, created_at";

/// Provides insert and filtered query operations for the action log.
pub struct ActionLogRepo;

impl ActionLogRepo {
    /// Insert one log entry.
    pub async fn create(pool: &PgPool, input: &CreateActionLog) -> Result<ActionLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO action_logs (user_id, username, action, target_type, target_id, details, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActionLog>(&query)
            .bind(input.user_id)
            .bind(&input.username)
            .bind(&input.action)
            .bind(&input.target_type)
            .bind(input.target_id)
            .bind(&input.details)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Query log entries with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &ActionLogQuery,
    ) -> Result<Vec<ActionLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).clamp(1, 500);
        let offset = params.offset.unwrap_or(0).max(0);

        let (where_clause, bind_values, bind_idx) = build_log_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM action_logs {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, ActionLog>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count log entries matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &ActionLogQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_log_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM action_logs {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q.fetch_one(pool).await
    }
}

/// Typed bind value for dynamically-built log queries.
enum BindValue {
    BigInt(DbId),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from the query parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The clause is
/// empty when no filters are active, or starts with `WHERE `.
fn build_log_filter(params: &ActionLogQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(user_id) = params.user_id {
        conditions.push(format!("user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(user_id));
    }

    if let Some(ref action) = params.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action.clone()));
    }

    if let Some(ref target_type) = params.target_type {
        conditions.push(format!("target_type = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(target_type.clone()));
    }

    if let Some(from) = params.from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
