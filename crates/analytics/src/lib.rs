//! # Pulse Analytics
//!
//! Turns an unordered, possibly duplicated stream of platform snapshots into
//! trustworthy daily series, period aggregates and goal pacing.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate. It performs no I/O and depends only on
//!   `core-types` (Layer 0). Callers fetch snapshots; this crate only computes.
//! - **Stateless Calculation:** Every component is a stateless calculator. Nothing is
//!   cached between calls, so concurrent callers never coordinate.
//! - **Total Arithmetic:** Sparse or malformed input degrades to zero. The only errors are
//!   contract violations (`AnalyticsError::InvalidArgument`).
//!
//! ## Pipeline
//!
//! snapshots -> [`Reconciler`] -> [`DailySeriesBuilder`] -> [`Aggregator`] / [`GoalProgressEngine`]

pub mod aggregator;
pub mod error;
pub mod goals;
pub mod reconciler;
pub mod report;
pub mod series;

use chrono::NaiveDate;
use core_types::{Goal, Platform, Snapshot};
use rust_decimal::Decimal;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::{change_pct, derived_ratio, Aggregator};
pub use error::AnalyticsError;
pub use goals::{GoalProgress, GoalProgressEngine, ON_TRACK_TOLERANCE};
pub use reconciler::{DayKey, ReconciledDay, ReconciledMap, Reconciler};
pub use report::{
    AggregatedMetrics, AggregationSpec, DayValues, DerivedRatios, PlatformValues, ProductTotal,
};
pub use series::{
    month_range, DailyRow, DailySeries, DailySeriesBuilder, SeriesTable, SeriesTableRow,
};

/// Collapses snapshots to one canonical value per (date, platform).
pub fn reconcile(snapshots: &[Snapshot]) -> ReconciledMap {
    Reconciler::new().reconcile(snapshots)
}

/// Expands reconciled values into a zero-filled series over `[start, end]`.
pub fn build_daily_series(
    reconciled: &ReconciledMap,
    start: NaiveDate,
    end: NaiveDate,
    platforms: &[Platform],
) -> Result<DailySeries, AnalyticsError> {
    DailySeriesBuilder::new().build(reconciled, start, end, platforms)
}

/// Reduces a series into the bundle a period view renders.
pub fn aggregate_period(series: &DailySeries, spec: &AggregationSpec) -> AggregatedMetrics {
    Aggregator::new().aggregate_period(series, spec)
}

/// Progress, pacing and profit for `goal` as of `today`.
pub fn compute_goal_progress(
    goal: &Goal,
    series: &DailySeries,
    facebook_series: &DailySeries,
    monthly_expenses: Decimal,
    today: NaiveDate,
) -> Result<GoalProgress, AnalyticsError> {
    GoalProgressEngine::new().compute_progress(
        goal,
        series,
        facebook_series,
        monthly_expenses,
        today,
    )
}
