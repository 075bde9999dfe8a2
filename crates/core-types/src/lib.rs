//! # Pulse Core Types
//!
//! Layer 0 of the workspace: the vocabulary every other crate speaks.
//!
//! - `Platform` and `MetricField` name the integrations and the numeric fields they report.
//! - `PlatformMetrics` is the per-platform discriminated union that replaces loosely typed
//!   metric maps. It is parsed leniently at the Snapshot Store boundary.
//! - `PlatformPolicy` is the strategy table consulted by reconciliation and aggregation.
//! - `Snapshot` and `Goal` are the externally owned records this system reads.

pub mod enums;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{month_bounds, GoalMetric, GoalPeriod, GoalStatus, MetricField, Platform};
pub use error::CoreError;
pub use metrics::{
    FacebookAdsMetrics, GoogleAnalyticsMetrics, MailerLiteMetrics, PlatformMetrics,
    ProductEntry, WooCommerceMetrics, WordPressMetrics,
};
pub use policy::{AggregationSemantics, FieldPolicy, PlatformPolicy, PlatformStyle};
pub use structs::{Goal, RawSnapshot, Snapshot};
