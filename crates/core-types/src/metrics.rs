use crate::enums::{MetricField, Platform};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// One product line inside a commerce snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub name: String,
    pub quantity: Decimal,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacebookAdsMetrics {
    pub spend: Option<Decimal>,
    pub impressions: Option<Decimal>,
    pub clicks: Option<Decimal>,
    pub reach: Option<Decimal>,
    pub conversions: Option<Decimal>,
    pub conversion_value: Option<Decimal>,
}

impl FacebookAdsMetrics {
    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match field {
            MetricField::Spend => Some(&self.spend),
            MetricField::Impressions => Some(&self.impressions),
            MetricField::Clicks => Some(&self.clicks),
            MetricField::Reach => Some(&self.reach),
            MetricField::Conversions => Some(&self.conversions),
            MetricField::ConversionValue => Some(&self.conversion_value),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match field {
            MetricField::Spend => Some(&mut self.spend),
            MetricField::Impressions => Some(&mut self.impressions),
            MetricField::Clicks => Some(&mut self.clicks),
            MetricField::Reach => Some(&mut self.reach),
            MetricField::Conversions => Some(&mut self.conversions),
            MetricField::ConversionValue => Some(&mut self.conversion_value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleAnalyticsMetrics {
    pub sessions: Option<Decimal>,
    pub users: Option<Decimal>,
    pub new_users: Option<Decimal>,
    pub pageviews: Option<Decimal>,
    /// Percent, 0-100.
    pub bounce_rate: Option<Decimal>,
    /// Seconds.
    pub avg_session_duration: Option<Decimal>,
    pub conversions: Option<Decimal>,
}

impl GoogleAnalyticsMetrics {
    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match field {
            MetricField::Sessions => Some(&self.sessions),
            MetricField::Users => Some(&self.users),
            MetricField::NewUsers => Some(&self.new_users),
            MetricField::Pageviews => Some(&self.pageviews),
            MetricField::BounceRate => Some(&self.bounce_rate),
            MetricField::AvgSessionDuration => Some(&self.avg_session_duration),
            MetricField::Conversions => Some(&self.conversions),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match field {
            MetricField::Sessions => Some(&mut self.sessions),
            MetricField::Users => Some(&mut self.users),
            MetricField::NewUsers => Some(&mut self.new_users),
            MetricField::Pageviews => Some(&mut self.pageviews),
            MetricField::BounceRate => Some(&mut self.bounce_rate),
            MetricField::AvgSessionDuration => Some(&mut self.avg_session_duration),
            MetricField::Conversions => Some(&mut self.conversions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WooCommerceMetrics {
    pub revenue: Option<Decimal>,
    pub orders: Option<Decimal>,
    /// Distinct products sold that day, as reported by the store.
    pub products: Option<Decimal>,
    pub refunds: Option<Decimal>,
    pub customers: Option<Decimal>,
    #[serde(default)]
    pub product_lines: Vec<ProductEntry>,
}

impl WooCommerceMetrics {
    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match field {
            MetricField::Revenue => Some(&self.revenue),
            MetricField::Orders => Some(&self.orders),
            MetricField::Products => Some(&self.products),
            MetricField::Refunds => Some(&self.refunds),
            MetricField::Customers => Some(&self.customers),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match field {
            MetricField::Revenue => Some(&mut self.revenue),
            MetricField::Orders => Some(&mut self.orders),
            MetricField::Products => Some(&mut self.products),
            MetricField::Refunds => Some(&mut self.refunds),
            MetricField::Customers => Some(&mut self.customers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailerLiteMetrics {
    pub total_subscribers: Option<Decimal>,
    pub new_subscribers: Option<Decimal>,
    pub unsubscribes: Option<Decimal>,
    pub emails_sent: Option<Decimal>,
    pub opens: Option<Decimal>,
    pub clicks: Option<Decimal>,
    pub open_rate: Option<Decimal>,
    pub click_rate: Option<Decimal>,
}

impl MailerLiteMetrics {
    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match field {
            MetricField::TotalSubscribers => Some(&self.total_subscribers),
            MetricField::NewSubscribers => Some(&self.new_subscribers),
            MetricField::Unsubscribes => Some(&self.unsubscribes),
            MetricField::EmailsSent => Some(&self.emails_sent),
            MetricField::Opens => Some(&self.opens),
            MetricField::Clicks => Some(&self.clicks),
            MetricField::OpenRate => Some(&self.open_rate),
            MetricField::ClickRate => Some(&self.click_rate),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match field {
            MetricField::TotalSubscribers => Some(&mut self.total_subscribers),
            MetricField::NewSubscribers => Some(&mut self.new_subscribers),
            MetricField::Unsubscribes => Some(&mut self.unsubscribes),
            MetricField::EmailsSent => Some(&mut self.emails_sent),
            MetricField::Opens => Some(&mut self.opens),
            MetricField::Clicks => Some(&mut self.clicks),
            MetricField::OpenRate => Some(&mut self.open_rate),
            MetricField::ClickRate => Some(&mut self.click_rate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordPressMetrics {
    pub total_posts: Option<Decimal>,
    pub new_posts: Option<Decimal>,
    pub comments: Option<Decimal>,
    pub pageviews: Option<Decimal>,
}

impl WordPressMetrics {
    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match field {
            MetricField::TotalPosts => Some(&self.total_posts),
            MetricField::NewPosts => Some(&self.new_posts),
            MetricField::Comments => Some(&self.comments),
            MetricField::Pageviews => Some(&self.pageviews),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match field {
            MetricField::TotalPosts => Some(&mut self.total_posts),
            MetricField::NewPosts => Some(&mut self.new_posts),
            MetricField::Comments => Some(&mut self.comments),
            MetricField::Pageviews => Some(&mut self.pageviews),
            _ => None,
        }
    }
}

/// The metrics payload of a snapshot, typed per platform.
///
/// Every numeric field is optional; readers go through [`PlatformMetrics::value`],
/// which reads an absent field (or a field foreign to the platform) as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum PlatformMetrics {
    FacebookAds(FacebookAdsMetrics),
    GoogleAnalytics(GoogleAnalyticsMetrics),
    WooCommerce(WooCommerceMetrics),
    MailerLite(MailerLiteMetrics),
    WordPress(WordPressMetrics),
}

impl PlatformMetrics {
    /// An all-absent payload for `platform`; reads as zero everywhere.
    pub fn empty(platform: Platform) -> Self {
        match platform {
            Platform::FacebookAds => PlatformMetrics::FacebookAds(Default::default()),
            Platform::GoogleAnalytics => PlatformMetrics::GoogleAnalytics(Default::default()),
            Platform::WooCommerce => PlatformMetrics::WooCommerce(Default::default()),
            Platform::MailerLite => PlatformMetrics::MailerLite(Default::default()),
            Platform::WordPress => PlatformMetrics::WordPress(Default::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PlatformMetrics::FacebookAds(_) => Platform::FacebookAds,
            PlatformMetrics::GoogleAnalytics(_) => Platform::GoogleAnalytics,
            PlatformMetrics::WooCommerce(_) => Platform::WooCommerce,
            PlatformMetrics::MailerLite(_) => Platform::MailerLite,
            PlatformMetrics::WordPress(_) => Platform::WordPress,
        }
    }

    fn slot(&self, field: MetricField) -> Option<&Option<Decimal>> {
        match self {
            PlatformMetrics::FacebookAds(m) => m.slot(field),
            PlatformMetrics::GoogleAnalytics(m) => m.slot(field),
            PlatformMetrics::WooCommerce(m) => m.slot(field),
            PlatformMetrics::MailerLite(m) => m.slot(field),
            PlatformMetrics::WordPress(m) => m.slot(field),
        }
    }

    fn slot_mut(&mut self, field: MetricField) -> Option<&mut Option<Decimal>> {
        match self {
            PlatformMetrics::FacebookAds(m) => m.slot_mut(field),
            PlatformMetrics::GoogleAnalytics(m) => m.slot_mut(field),
            PlatformMetrics::WooCommerce(m) => m.slot_mut(field),
            PlatformMetrics::MailerLite(m) => m.slot_mut(field),
            PlatformMetrics::WordPress(m) => m.slot_mut(field),
        }
    }

    /// The raw field, `None` when the payload did not carry it.
    pub fn get(&self, field: MetricField) -> Option<Decimal> {
        self.slot(field).copied().flatten()
    }

    /// The field with the zero default applied.
    pub fn value(&self, field: MetricField) -> Decimal {
        self.get(field).unwrap_or(Decimal::ZERO)
    }

    /// Sets a field. Returns `false` if the field does not belong to this platform.
    pub fn set(&mut self, field: MetricField, value: Decimal) -> bool {
        match self.slot_mut(field) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn products(&self) -> &[ProductEntry] {
        match self {
            PlatformMetrics::WooCommerce(m) => &m.product_lines,
            _ => &[],
        }
    }

    /// Parses a loosely shaped JSON metrics map for `platform`.
    ///
    /// Never fails: unknown keys are ignored, non-numeric values are dropped, and a
    /// payload that is not an object yields an all-absent variant.
    pub fn from_json(platform: Platform, payload: &Value) -> Self {
        let mut metrics = PlatformMetrics::empty(platform);
        let Some(object) = payload.as_object() else {
            return metrics;
        };

        for policy in platform.policy().fields {
            if let Some(value) = lookup_number(object, policy.field.json_keys()) {
                metrics.set(policy.field, value);
            }
        }

        if let PlatformMetrics::WooCommerce(woo) = &mut metrics {
            woo.product_lines = parse_products(object);
        }

        metrics
    }
}

fn lookup_number(object: &Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(to_decimal)
}

/// Reads JSON numbers and numeric strings; everything else is `None`.
pub(crate) fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

fn parse_products(object: &Map<String, Value>) -> Vec<ProductEntry> {
    let Some(items) = ["products", "top_products", "topProducts"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?.trim();
            if name.is_empty() {
                return None;
            }
            Some(ProductEntry {
                name: name.to_string(),
                quantity: lookup_number(item, &["quantity", "qty"]).unwrap_or(Decimal::ZERO),
                revenue: lookup_number(item, &["revenue", "total"]).unwrap_or(Decimal::ZERO),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn camel_case_commerce_payload_is_read() {
        let payload = json!({
            "totalRevenue": 150.25,
            "totalOrders": 3,
            "productsSold": "7",
            "products": [
                {"name": "Mug", "quantity": 2, "revenue": 40},
                {"name": "", "quantity": 1, "revenue": 5},
                {"quantity": 1, "revenue": 5}
            ]
        });
        let metrics = PlatformMetrics::from_json(Platform::WooCommerce, &payload);
        assert_eq!(metrics.value(MetricField::Revenue), dec!(150.25));
        assert_eq!(metrics.value(MetricField::Orders), dec!(3));
        assert_eq!(metrics.value(MetricField::Products), dec!(7));
        assert_eq!(metrics.products().len(), 1);
        assert_eq!(metrics.products()[0].name, "Mug");
    }

    #[test]
    fn malformed_payload_reads_as_zero() {
        let metrics = PlatformMetrics::from_json(Platform::FacebookAds, &json!("not a map"));
        assert_eq!(metrics, PlatformMetrics::empty(Platform::FacebookAds));
        assert_eq!(metrics.value(MetricField::Spend), Decimal::ZERO);

        let metrics = PlatformMetrics::from_json(
            Platform::FacebookAds,
            &json!({"spend": null, "impressions": "lots", "clicks": true}),
        );
        assert_eq!(metrics.get(MetricField::Spend), None);
        assert_eq!(metrics.get(MetricField::Impressions), None);
        assert_eq!(metrics.get(MetricField::Clicks), None);
    }

    #[test]
    fn foreign_fields_read_as_zero_and_cannot_be_set() {
        let mut metrics = PlatformMetrics::empty(Platform::MailerLite);
        assert_eq!(metrics.value(MetricField::Revenue), Decimal::ZERO);
        assert!(!metrics.set(MetricField::Revenue, dec!(10)));
        assert!(metrics.set(MetricField::Opens, dec!(10)));
        assert_eq!(metrics.value(MetricField::Opens), dec!(10));
    }

    #[test]
    fn scientific_strings_are_accepted() {
        assert_eq!(to_decimal(&json!("1.5e3")), Some(dec!(1500)));
        assert_eq!(to_decimal(&json!(" 42 ")), Some(dec!(42)));
    }
}
