use crate::{into_snapshots, DbError, SnapshotStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{CoreError, Goal, Platform, RawSnapshot, Snapshot};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// The PostgreSQL-backed `SnapshotStore`.
///
/// Expects the tables written by the sync service:
/// `integration_snapshots`, `clients` (`monthly_expenses`) and `goals`.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

/// A row from the `integration_snapshots` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbSnapshot {
    pub id: Uuid,
    pub client_id: Uuid,
    pub integration_id: Uuid,
    pub platform: String,
    pub metric_type: String,
    pub date: NaiveDate,
    pub metrics: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl From<DbSnapshot> for RawSnapshot {
    fn from(row: DbSnapshot) -> Self {
        RawSnapshot {
            id: row.id,
            client_id: row.client_id,
            integration_id: row.integration_id,
            platform: row.platform,
            metric_type: row.metric_type,
            date: row.date,
            metrics: row.metrics,
            created_at: row.created_at,
        }
    }
}

/// A row from the `goals` table. Enumerations are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct DbGoal {
    pub id: Uuid,
    pub client_id: Uuid,
    pub metric_type: String,
    pub target_value: Decimal,
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: Option<String>,
    pub description: Option<String>,
    pub status: String,
}

impl TryFrom<DbGoal> for Goal {
    type Error = CoreError;

    fn try_from(row: DbGoal) -> Result<Self, Self::Error> {
        Ok(Goal {
            id: row.id,
            client_id: row.client_id,
            metric_type: row.metric_type.parse()?,
            target_value: row.target_value,
            period: row.period.parse()?,
            start_date: row.start_date,
            end_date: row.end_date,
            label: row.label,
            description: row.description,
            status: row.status.parse()?,
        })
    }
}

impl PgSnapshotStore {
    /// Creates a new `PgSnapshotStore` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn query_snapshots(
        &self,
        client_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
        platforms: Option<&[Platform]>,
    ) -> Result<Vec<Snapshot>, DbError> {
        let platform_names: Option<Vec<String>> =
            platforms.map(|ps| ps.iter().map(|p| p.as_str().to_string()).collect());

        let rows = sqlx::query_as::<_, DbSnapshot>(
            r#"
            SELECT id, client_id, integration_id, platform, metric_type, date, metrics, created_at
            FROM integration_snapshots
            WHERE client_id = $1
              AND date >= $2
              AND date <= $3
              AND ($4::text[] IS NULL OR platform = ANY($4))
            "#,
        )
        .bind(client_id)
        .bind(date_from)
        .bind(date_to)
        .bind(platform_names)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(%client_id, %date_from, %date_to, rows = rows.len(), "Fetched snapshots");
        Ok(into_snapshots(rows.into_iter().map(RawSnapshot::from).collect()))
    }

    async fn get_monthly_expenses(&self, client_id: Uuid) -> Result<Decimal, DbError> {
        let expenses = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT monthly_expenses FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expenses.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn get_goals(&self, client_id: Uuid) -> Result<Vec<Goal>, DbError> {
        let rows = sqlx::query_as::<_, DbGoal>(
            r#"
            SELECT id, client_id, metric_type, target_value, period, start_date, end_date,
                   label, description, status
            FROM goals
            WHERE client_id = $1
            ORDER BY start_date ASC, id ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        let goals = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Goal::try_from(row) {
                    Ok(goal) => Some(goal),
                    Err(e) => {
                        tracing::warn!(goal = %id, error = %e, "Skipping goal");
                        None
                    }
                }
            })
            .collect();
        Ok(goals)
    }
}
