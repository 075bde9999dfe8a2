//! # Pulse Snapshot Store
//!
//! The read-only boundary between the analytics core and wherever sync jobs keep
//! their snapshots.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** Encapsulates all storage-specific logic behind the
//!   `SnapshotStore` trait so the rest of the application never sees SQL.
//! - **Read Only:** Snapshots, client expenses and goals are owned by other services.
//!   Nothing here writes.
//! - **Boundary Validation:** Loose JSON metric payloads become typed `Snapshot`s here.
//!   Rows that cannot be typed are skipped with a warning rather than failing the read.
//!
//! ## Public API
//!
//! - `SnapshotStore`: the trait the CLI (and any other caller) programs against.
//! - `PgSnapshotStore`: the PostgreSQL implementation, built on `connect`.
//! - `InMemorySnapshotStore`: a fixture-backed implementation for tests and demos.
//! - `DbError`: the specific error types that can be returned from this crate.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Goal, Platform, RawSnapshot, Snapshot};
use rust_decimal::Decimal;
use uuid::Uuid;

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use error::DbError;
pub use memory::{Fixture, InMemorySnapshotStore};
pub use repository::PgSnapshotStore;

/// Read access to a client's snapshots and the figures stored alongside them.
///
/// No ordering of the returned snapshots is guaranteed.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Snapshots dated within `[date_from, date_to]`, optionally limited to `platforms`.
    async fn query_snapshots(
        &self,
        client_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
        platforms: Option<&[Platform]>,
    ) -> Result<Vec<Snapshot>, DbError>;

    /// The client's fixed monthly operating cost; zero when none is recorded.
    async fn get_monthly_expenses(&self, client_id: Uuid) -> Result<Decimal, DbError>;

    /// Every goal defined for the client, whatever its status.
    async fn get_goals(&self, client_id: Uuid) -> Result<Vec<Goal>, DbError>;
}

/// Types raw rows, dropping the ones whose platform is unknown.
pub(crate) fn into_snapshots(rows: Vec<RawSnapshot>) -> Vec<Snapshot> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Snapshot::try_from(row) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(snapshot = %id, error = %e, "Skipping snapshot");
                    None
                }
            }
        })
        .collect()
}
