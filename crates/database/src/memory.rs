use crate::{into_snapshots, DbError, SnapshotStore};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Goal, Platform, RawSnapshot, Snapshot};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// The on-disk shape of a fixture file.
///
/// ```json
/// { "snapshots": [...], "expenses": { "<client uuid>": "1500" }, "goals": [...] }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub snapshots: Vec<RawSnapshot>,
    pub expenses: HashMap<Uuid, Decimal>,
    pub goals: Vec<Goal>,
}

/// A `SnapshotStore` serving a fixed set of rows from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Vec<RawSnapshot>,
    expenses: HashMap<Uuid, Decimal>,
    goals: Vec<Goal>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            snapshots: fixture.snapshots,
            expenses: fixture.expenses,
            goals: fixture.goals,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DbError> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self::from_fixture(fixture))
    }

    /// Reads a fixture file from disk.
    pub async fn load(path: &Path) -> Result<Self, DbError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            snapshots = store.snapshots.len(),
            goals = store.goals.len(),
            "Loaded snapshot fixture"
        );
        Ok(store)
    }

    pub fn with_snapshot(mut self, snapshot: RawSnapshot) -> Self {
        self.snapshots.push(snapshot);
        self
    }

    pub fn with_expenses(mut self, client_id: Uuid, monthly_expenses: Decimal) -> Self {
        self.expenses.insert(client_id, monthly_expenses);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn query_snapshots(
        &self,
        client_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
        platforms: Option<&[Platform]>,
    ) -> Result<Vec<Snapshot>, DbError> {
        let rows: Vec<RawSnapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.client_id == client_id && s.date >= date_from && s.date <= date_to)
            .cloned()
            .collect();

        let snapshots = into_snapshots(rows);
        Ok(match platforms {
            Some(platforms) => snapshots
                .into_iter()
                .filter(|s| platforms.contains(&s.platform()))
                .collect(),
            None => snapshots,
        })
    }

    async fn get_monthly_expenses(&self, client_id: Uuid) -> Result<Decimal, DbError> {
        Ok(self.expenses.get(&client_id).copied().unwrap_or(Decimal::ZERO))
    }

    async fn get_goals(&self, client_id: Uuid) -> Result<Vec<Goal>, DbError> {
        Ok(self
            .goals
            .iter()
            .filter(|g| g.client_id == client_id)
            .cloned()
            .collect())
    }
}
