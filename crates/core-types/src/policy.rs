use crate::enums::{MetricField, Platform};
use crate::metrics::PlatformMetrics;
use rust_decimal::Decimal;
use serde::Serialize;

/// How same-day snapshots of a platform relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStyle {
    /// Each snapshot is a running total for the day; later syncs see more of it.
    Cumulative,
    /// Each snapshot measures an accumulating flow such as spend.
    Flow,
}

/// How a field collapses across the days of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationSemantics {
    /// Plain arithmetic sum.
    Sum,
    /// Mean over the days where the field is non-zero.
    Average,
    /// Value of the last day where the field is non-zero (gauges such as list size).
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub field: MetricField,
    pub semantics: AggregationSemantics,
}

const fn sum(field: MetricField) -> FieldPolicy {
    FieldPolicy { field, semantics: AggregationSemantics::Sum }
}

const fn average(field: MetricField) -> FieldPolicy {
    FieldPolicy { field, semantics: AggregationSemantics::Average }
}

const fn latest(field: MetricField) -> FieldPolicy {
    FieldPolicy { field, semantics: AggregationSemantics::Latest }
}

/// One row of the platform strategy table.
///
/// Reconciliation reads `indicator`/`fallback_indicator`; aggregation and export read `fields`.
#[derive(Debug, PartialEq, Eq)]
pub struct PlatformPolicy {
    pub platform: Platform,
    pub style: PlatformStyle,
    pub indicator: MetricField,
    pub fallback_indicator: Option<MetricField>,
    /// Tracked fields in export column order.
    pub fields: &'static [FieldPolicy],
}

static FACEBOOK_ADS: PlatformPolicy = PlatformPolicy {
    platform: Platform::FacebookAds,
    style: PlatformStyle::Flow,
    indicator: MetricField::Spend,
    fallback_indicator: Some(MetricField::Impressions),
    fields: &[
        sum(MetricField::Spend),
        sum(MetricField::Impressions),
        sum(MetricField::Clicks),
        sum(MetricField::Reach),
        sum(MetricField::Conversions),
        sum(MetricField::ConversionValue),
    ],
};

static GOOGLE_ANALYTICS: PlatformPolicy = PlatformPolicy {
    platform: Platform::GoogleAnalytics,
    style: PlatformStyle::Flow,
    indicator: MetricField::Sessions,
    fallback_indicator: Some(MetricField::Pageviews),
    fields: &[
        sum(MetricField::Sessions),
        sum(MetricField::Users),
        sum(MetricField::NewUsers),
        sum(MetricField::Pageviews),
        average(MetricField::BounceRate),
        average(MetricField::AvgSessionDuration),
        sum(MetricField::Conversions),
    ],
};

static WOOCOMMERCE: PlatformPolicy = PlatformPolicy {
    platform: Platform::WooCommerce,
    style: PlatformStyle::Cumulative,
    indicator: MetricField::Revenue,
    fallback_indicator: None,
    fields: &[
        sum(MetricField::Revenue),
        sum(MetricField::Orders),
        sum(MetricField::Products),
        sum(MetricField::Refunds),
        sum(MetricField::Customers),
    ],
};

static MAILERLITE: PlatformPolicy = PlatformPolicy {
    platform: Platform::MailerLite,
    style: PlatformStyle::Flow,
    indicator: MetricField::EmailsSent,
    fallback_indicator: Some(MetricField::TotalSubscribers),
    fields: &[
        latest(MetricField::TotalSubscribers),
        sum(MetricField::NewSubscribers),
        sum(MetricField::Unsubscribes),
        sum(MetricField::EmailsSent),
        sum(MetricField::Opens),
        sum(MetricField::Clicks),
        average(MetricField::OpenRate),
        average(MetricField::ClickRate),
    ],
};

static WORDPRESS: PlatformPolicy = PlatformPolicy {
    platform: Platform::WordPress,
    style: PlatformStyle::Cumulative,
    indicator: MetricField::Pageviews,
    fallback_indicator: Some(MetricField::TotalPosts),
    fields: &[
        latest(MetricField::TotalPosts),
        sum(MetricField::NewPosts),
        sum(MetricField::Comments),
        sum(MetricField::Pageviews),
    ],
};

impl Platform {
    /// The strategy-table row for this platform.
    pub fn policy(&self) -> &'static PlatformPolicy {
        match self {
            Platform::FacebookAds => &FACEBOOK_ADS,
            Platform::GoogleAnalytics => &GOOGLE_ANALYTICS,
            Platform::WooCommerce => &WOOCOMMERCE,
            Platform::MailerLite => &MAILERLITE,
            Platform::WordPress => &WORDPRESS,
        }
    }
}

impl PlatformPolicy {
    pub fn tracks(&self, field: MetricField) -> bool {
        self.fields.iter().any(|p| p.field == field)
    }

    pub fn semantics(&self, field: MetricField) -> Option<AggregationSemantics> {
        self.fields.iter().find(|p| p.field == field).map(|p| p.semantics)
    }

    /// The value snapshots of this platform are ranked by during reconciliation.
    ///
    /// The primary indicator wins whenever the payload carries it; otherwise the
    /// fallback is used. Missing both reads as zero.
    pub fn indicator_value(&self, metrics: &PlatformMetrics) -> Decimal {
        metrics
            .get(self.indicator)
            .or_else(|| self.fallback_indicator.and_then(|f| metrics.get(f)))
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FacebookAdsMetrics;
    use rust_decimal_macros::dec;

    #[test]
    fn every_policy_tracks_its_indicators() {
        for platform in Platform::ALL {
            let policy = platform.policy();
            assert_eq!(policy.platform, platform);
            assert!(policy.tracks(policy.indicator), "{platform} indicator untracked");
            if let Some(fallback) = policy.fallback_indicator {
                assert!(policy.tracks(fallback), "{platform} fallback untracked");
            }
        }
    }

    #[test]
    fn cumulative_platforms_are_commerce_and_content() {
        assert_eq!(Platform::WooCommerce.policy().style, PlatformStyle::Cumulative);
        assert_eq!(Platform::WordPress.policy().style, PlatformStyle::Cumulative);
        assert_eq!(Platform::FacebookAds.policy().style, PlatformStyle::Flow);
    }

    #[test]
    fn facebook_indicator_falls_back_to_impressions_without_spend() {
        let policy = Platform::FacebookAds.policy();
        let no_spend = PlatformMetrics::FacebookAds(FacebookAdsMetrics {
            impressions: Some(dec!(900)),
            ..Default::default()
        });
        assert_eq!(policy.indicator_value(&no_spend), dec!(900));

        let with_spend = PlatformMetrics::FacebookAds(FacebookAdsMetrics {
            spend: Some(dec!(12.5)),
            impressions: Some(dec!(900)),
            ..Default::default()
        });
        assert_eq!(policy.indicator_value(&with_spend), dec!(12.5));
    }

    #[test]
    fn rate_fields_average_and_gauges_keep_latest() {
        let ga = Platform::GoogleAnalytics.policy();
        assert_eq!(ga.semantics(MetricField::BounceRate), Some(AggregationSemantics::Average));
        let ml = Platform::MailerLite.policy();
        assert_eq!(ml.semantics(MetricField::TotalSubscribers), Some(AggregationSemantics::Latest));
        assert_eq!(ml.semantics(MetricField::Spend), None);
    }
}
