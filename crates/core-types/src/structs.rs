use crate::enums::{GoalMetric, GoalPeriod, GoalStatus, Platform};
use crate::error::CoreError;
use crate::metrics::PlatformMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A snapshot row exactly as the Snapshot Store holds it.
///
/// `platform` is free text and `metrics` is untyped JSON; [`Snapshot::try_from`] validates both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub id: Uuid,
    pub client_id: Uuid,
    pub integration_id: Uuid,
    pub platform: String,
    pub metric_type: String,
    pub date: NaiveDate,
    pub metrics: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One immutable measurement for a client, platform and calendar day.
///
/// Several snapshots may exist for the same day and platform when sync runs overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub client_id: Uuid,
    pub integration_id: Uuid,
    pub metric_type: String,
    pub date: NaiveDate,
    pub metrics: PlatformMetrics,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn platform(&self) -> Platform {
        self.metrics.platform()
    }
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = CoreError;

    /// Fails only on an unrecognised platform. Metric payloads are parsed leniently.
    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let platform: Platform = raw.platform.parse()?;
        Ok(Snapshot {
            id: raw.id,
            client_id: raw.client_id,
            integration_id: raw.integration_id,
            metric_type: raw.metric_type,
            date: raw.date,
            metrics: PlatformMetrics::from_json(platform, &raw.metrics),
            created_at: raw.created_at,
        })
    }
}

/// A client's target for one metric over a date window. Persisted and owned externally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub client_id: Uuid,
    pub metric_type: GoalMetric,
    pub target_value: Decimal,
    pub period: GoalPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: Option<String>,
    pub description: Option<String>,
    pub status: GoalStatus,
}

impl Goal {
    /// A display name: the label when set, otherwise the metric and period.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("{} ({:?})", self.metric_type.as_str(), self.period).to_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::MetricField;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn raw(platform: &str) -> RawSnapshot {
        RawSnapshot {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            integration_id: Uuid::new_v4(),
            platform: platform.to_string(),
            metric_type: "daily_summary".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            metrics: json!({"spend": "40.10", "impressions": 1200}),
            created_at: Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn raw_snapshot_becomes_typed() {
        let snapshot = Snapshot::try_from(raw("facebook_ads")).unwrap();
        assert_eq!(snapshot.platform(), Platform::FacebookAds);
        assert_eq!(snapshot.metrics.value(MetricField::Spend), dec!(40.10));
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let err = Snapshot::try_from(raw("myspace")).unwrap_err();
        assert_eq!(err, CoreError::InvalidInput("platform".to_string(), "myspace".to_string()));
    }

    #[test]
    fn display_name_falls_back_to_metric() {
        let goal = Goal {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            metric_type: GoalMetric::Orders,
            target_value: dec!(200),
            period: GoalPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            label: None,
            description: None,
            status: GoalStatus::Active,
        };
        assert_eq!(goal.display_name(), "orders (monthly)");
    }
}
