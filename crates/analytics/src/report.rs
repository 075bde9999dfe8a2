use chrono::NaiveDate;
use core_types::{MetricField, Platform};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field values keyed by platform, then by field.
pub type PlatformValues = BTreeMap<Platform, BTreeMap<MetricField, Decimal>>;

/// What a calling view wants aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Platforms to report on. Ratios are always computed from whatever the series holds.
    pub platforms: Vec<Platform>,
    /// Cap on the period top-product ranking; `None` keeps every product.
    pub top_products: Option<usize>,
    /// Anchor for the "today" and "yesterday" figures.
    pub today: Option<NaiveDate>,
}

impl Default for AggregationSpec {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
            top_products: Some(10),
            today: None,
        }
    }
}

/// Period efficiency ratios. Each is zero when its denominator is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    /// Click-through rate, percent of impressions.
    pub ctr: Decimal,
    /// Cost per click.
    pub cpc: Decimal,
    /// Cost per thousand impressions.
    pub cpm: Decimal,
    /// Commerce revenue over ad spend.
    pub roas: Decimal,
    /// Average order value.
    pub aov: Decimal,
    /// Ad conversions, percent of clicks.
    pub conversion_rate: Decimal,
}

/// Revenue and quantity of one product summed over a period or a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    pub name: String,
    pub quantity: Decimal,
    pub revenue: Decimal,
}

/// The un-aggregated values of a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayValues {
    pub date: NaiveDate,
    pub values: PlatformValues,
    pub top_products: Vec<ProductTotal>,
}

impl DayValues {
    pub fn value(&self, platform: Platform, field: MetricField) -> Decimal {
        lookup(&self.values, platform, field)
    }
}

/// The bundle a period view renders: sums, averages, gauges, ratios and point-in-time values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,

    // I. Per-field period figures, split by aggregation semantics.
    pub totals: PlatformValues,
    pub averages: PlatformValues,
    pub latest: PlatformValues,

    // II. Efficiency
    pub ratios: DerivedRatios,

    // III. Products
    pub top_products: Vec<ProductTotal>,

    // IV. Point-in-time
    pub first_day: Option<DayValues>,
    pub last_day: Option<DayValues>,
    pub today: Option<DayValues>,
    pub yesterday: Option<DayValues>,
}

impl AggregatedMetrics {
    /// Creates an empty bundle for the period; every figure reads as zero.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            days: 0,
            totals: PlatformValues::new(),
            averages: PlatformValues::new(),
            latest: PlatformValues::new(),
            ratios: DerivedRatios::default(),
            top_products: Vec::new(),
            first_day: None,
            last_day: None,
            today: None,
            yesterday: None,
        }
    }

    /// The period figure of a field under its own aggregation semantics.
    pub fn figure(&self, platform: Platform, field: MetricField) -> Decimal {
        [&self.totals, &self.averages, &self.latest]
            .into_iter()
            .find_map(|values| values.get(&platform).and_then(|fields| fields.get(&field)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self, platform: Platform, field: MetricField) -> Decimal {
        lookup(&self.totals, platform, field)
    }
}

fn lookup(values: &PlatformValues, platform: Platform, field: MetricField) -> Decimal {
    values
        .get(&platform)
        .and_then(|fields| fields.get(&field))
        .copied()
        .unwrap_or(Decimal::ZERO)
}
