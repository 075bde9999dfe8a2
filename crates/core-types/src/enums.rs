use crate::error::CoreError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The third-party integrations a client can connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    FacebookAds,
    GoogleAnalytics,
    WooCommerce,
    MailerLite,
    WordPress,
}

impl Platform {
    /// Every platform, in declaration order. Export column order follows this.
    pub const ALL: [Platform; 5] = [
        Platform::FacebookAds,
        Platform::GoogleAnalytics,
        Platform::WooCommerce,
        Platform::MailerLite,
        Platform::WordPress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::FacebookAds => "facebook_ads",
            Platform::GoogleAnalytics => "google_analytics",
            Platform::WooCommerce => "woocommerce",
            Platform::MailerLite => "mailerlite",
            Platform::WordPress => "wordpress",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| CoreError::InvalidInput("platform".to_string(), s.to_string()))
    }
}

/// Every numeric field tracked across all platforms.
///
/// A field is only meaningful on the platforms whose policy lists it; reading it
/// anywhere else yields zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    // Ads
    Spend,
    Impressions,
    Clicks,
    Reach,
    Conversions,
    ConversionValue,
    // Web analytics
    Sessions,
    Users,
    NewUsers,
    Pageviews,
    BounceRate,
    AvgSessionDuration,
    // Commerce
    Revenue,
    Orders,
    Products,
    Refunds,
    Customers,
    // Email
    TotalSubscribers,
    NewSubscribers,
    Unsubscribes,
    EmailsSent,
    Opens,
    OpenRate,
    ClickRate,
    // Content
    TotalPosts,
    NewPosts,
    Comments,
}

impl MetricField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Spend => "spend",
            MetricField::Impressions => "impressions",
            MetricField::Clicks => "clicks",
            MetricField::Reach => "reach",
            MetricField::Conversions => "conversions",
            MetricField::ConversionValue => "conversion_value",
            MetricField::Sessions => "sessions",
            MetricField::Users => "users",
            MetricField::NewUsers => "new_users",
            MetricField::Pageviews => "pageviews",
            MetricField::BounceRate => "bounce_rate",
            MetricField::AvgSessionDuration => "avg_session_duration",
            MetricField::Revenue => "revenue",
            MetricField::Orders => "orders",
            MetricField::Products => "products",
            MetricField::Refunds => "refunds",
            MetricField::Customers => "customers",
            MetricField::TotalSubscribers => "total_subscribers",
            MetricField::NewSubscribers => "new_subscribers",
            MetricField::Unsubscribes => "unsubscribes",
            MetricField::EmailsSent => "emails_sent",
            MetricField::Opens => "opens",
            MetricField::OpenRate => "open_rate",
            MetricField::ClickRate => "click_rate",
            MetricField::TotalPosts => "total_posts",
            MetricField::NewPosts => "new_posts",
            MetricField::Comments => "comments",
        }
    }

    /// Keys under which sync jobs have been seen to write this field, in lookup order.
    pub fn json_keys(&self) -> &'static [&'static str] {
        match self {
            MetricField::Spend => &["spend", "amount_spent", "amountSpent"],
            MetricField::Impressions => &["impressions"],
            MetricField::Clicks => &["clicks", "link_clicks", "linkClicks"],
            MetricField::Reach => &["reach"],
            MetricField::Conversions => &["conversions", "purchases"],
            MetricField::ConversionValue => &[
                "conversion_value",
                "conversionValue",
                "purchase_value",
                "purchaseValue",
            ],
            MetricField::Sessions => &["sessions"],
            MetricField::Users => &["users", "total_users", "totalUsers"],
            MetricField::NewUsers => &["new_users", "newUsers"],
            MetricField::Pageviews => &["pageviews", "page_views", "pageViews", "screenPageViews"],
            MetricField::BounceRate => &["bounce_rate", "bounceRate"],
            MetricField::AvgSessionDuration => &[
                "avg_session_duration",
                "avgSessionDuration",
                "averageSessionDuration",
            ],
            MetricField::Revenue => &["total_revenue", "totalRevenue", "revenue"],
            MetricField::Orders => &["total_orders", "totalOrders", "orders"],
            MetricField::Products => &[
                "products_sold",
                "productsSold",
                "total_products",
                "totalProducts",
            ],
            MetricField::Refunds => &["refunds", "total_refunds", "totalRefunds"],
            MetricField::Customers => &["customers", "new_customers", "newCustomers"],
            MetricField::TotalSubscribers => &[
                "total_subscribers",
                "totalSubscribers",
                "subscribers",
            ],
            MetricField::NewSubscribers => &["new_subscribers", "newSubscribers"],
            MetricField::Unsubscribes => &["unsubscribes", "unsubscribed"],
            MetricField::EmailsSent => &["emails_sent", "emailsSent", "sent"],
            MetricField::Opens => &["opens", "opens_count", "opensCount"],
            MetricField::OpenRate => &["open_rate", "openRate"],
            MetricField::ClickRate => &["click_rate", "clickRate"],
            MetricField::TotalPosts => &["total_posts", "totalPosts", "posts"],
            MetricField::NewPosts => &["new_posts", "newPosts"],
            MetricField::Comments => &["comments", "total_comments", "totalComments"],
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a goal measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalMetric {
    Revenue,
    Orders,
    Products,
    Conversions,
    Roas,
    Custom,
}

impl GoalMetric {
    /// The series slot a goal of this type reads from.
    ///
    /// `Roas` is computed from two slots and `Custom` has no automatic source; both return `None`.
    pub fn source(&self) -> Option<(Platform, MetricField)> {
        match self {
            GoalMetric::Revenue => Some((Platform::WooCommerce, MetricField::Revenue)),
            GoalMetric::Orders => Some((Platform::WooCommerce, MetricField::Orders)),
            GoalMetric::Products => Some((Platform::WooCommerce, MetricField::Products)),
            GoalMetric::Conversions => Some((Platform::GoogleAnalytics, MetricField::Conversions)),
            GoalMetric::Roas | GoalMetric::Custom => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalMetric::Revenue => "revenue",
            GoalMetric::Orders => "orders",
            GoalMetric::Products => "products",
            GoalMetric::Conversions => "conversions",
            GoalMetric::Roas => "roas",
            GoalMetric::Custom => "custom",
        }
    }
}

impl FromStr for GoalMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "revenue" => Ok(GoalMetric::Revenue),
            "orders" => Ok(GoalMetric::Orders),
            "products" => Ok(GoalMetric::Products),
            "conversions" => Ok(GoalMetric::Conversions),
            "roas" => Ok(GoalMetric::Roas),
            "custom" => Ok(GoalMetric::Custom),
            other => Err(CoreError::InvalidInput("goal metric".to_string(), other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl GoalPeriod {
    /// The natural window of this period containing `anchor`.
    ///
    /// Weeks run Monday to Sunday.
    pub fn window(&self, anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate), CoreError> {
        match self {
            GoalPeriod::Daily => Ok((anchor, anchor)),
            GoalPeriod::Weekly => {
                let start = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
                Ok((start, start + Duration::days(6)))
            }
            GoalPeriod::Monthly => month_bounds(anchor.year(), anchor.month()),
            GoalPeriod::Yearly => {
                let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1);
                let end = NaiveDate::from_ymd_opt(anchor.year(), 12, 31);
                start.zip(end).ok_or_else(|| {
                    CoreError::Calculation(format!("year {} is out of range", anchor.year()))
                })
            }
        }
    }
}

impl FromStr for GoalPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(GoalPeriod::Daily),
            "weekly" => Ok(GoalPeriod::Weekly),
            "monthly" => Ok(GoalPeriod::Monthly),
            "yearly" => Ok(GoalPeriod::Yearly),
            other => Err(CoreError::InvalidInput("goal period".to_string(), other.to_string())),
        }
    }
}

/// Lifecycle of a goal. Written by people or external processes, only read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Failed,
    Archived,
}

impl FromStr for GoalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "failed" => Ok(GoalStatus::Failed),
            "archived" => Ok(GoalStatus::Archived),
            other => Err(CoreError::InvalidInput("goal status".to_string(), other.to_string())),
        }
    }
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::InvalidInput("month".to_string(), format!("{year}-{month:02}")))?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| CoreError::Calculation(format!("no last day for {year}-{month:02}")))?;
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn platform_parses_its_own_name() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("tiktok_ads".parse::<Platform>().is_err());
    }

    #[test]
    fn platform_serializes_snake_case() {
        let json = serde_json::to_string(&Platform::FacebookAds).unwrap();
        assert_eq!(json, "\"facebook_ads\"");
    }

    #[test]
    fn weekly_window_starts_on_monday() {
        // 2025-01-16 is a Thursday.
        let (start, end) = GoalPeriod::Weekly.window(date(2025, 1, 16)).unwrap();
        assert_eq!(start, date(2025, 1, 13));
        assert_eq!(end, date(2025, 1, 19));
    }

    #[test]
    fn monthly_window_handles_leap_february() {
        let (start, end) = GoalPeriod::Monthly.window(date(2024, 2, 10)).unwrap();
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29));
    }

    #[test]
    fn december_bounds_roll_into_next_year() {
        assert_eq!(month_bounds(2025, 12).unwrap(), (date(2025, 12, 1), date(2025, 12, 31)));
        assert!(month_bounds(2025, 13).is_err());
    }

    #[test]
    fn conversions_goal_reads_analytics() {
        assert_eq!(
            GoalMetric::Conversions.source(),
            Some((Platform::GoogleAnalytics, MetricField::Conversions))
        );
        assert_eq!(GoalMetric::Custom.source(), None);
    }
}
