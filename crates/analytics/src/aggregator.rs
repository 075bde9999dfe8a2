use crate::report::{
    AggregatedMetrics, AggregationSpec, DayValues, DerivedRatios, PlatformValues, ProductTotal,
};
use crate::series::{DailyRow, DailySeries};
use chrono::NaiveDate;
use core_types::{AggregationSemantics, MetricField, Platform, ProductEntry};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const THOUSAND: Decimal = Decimal::ONE_THOUSAND;

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// Also zero if the quotient overflows, so no caller ever sees a panic.
pub fn derived_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Percent change from `previous` to `current`; zero when there is no previous value.
pub fn change_pct(current: Decimal, previous: Decimal) -> Decimal {
    derived_ratio(current.saturating_sub(previous), previous.abs()).saturating_mul(HUNDRED)
}

/// A stateless set of reducers over a [`DailySeries`].
///
/// Every reducer is total: empty series, absent platforms and zero denominators all
/// produce zero. Sums and scaled ratios saturate at `Decimal::MAX`/`Decimal::MIN`
/// instead of overflowing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator {}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sum(&self, series: &DailySeries, platform: Platform, field: MetricField) -> Decimal {
        series
            .days
            .iter()
            .map(|row| row.value(platform, field))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Mean over the days where the field is non-zero.
    pub fn average(
        &self,
        series: &DailySeries,
        platform: Platform,
        field: MetricField,
    ) -> Decimal {
        let (total, count) = series
            .days
            .iter()
            .map(|row| row.value(platform, field))
            .filter(|v| !v.is_zero())
            .fold((Decimal::ZERO, 0u32), |(total, count), v| {
                (total.saturating_add(v), count + 1)
            });
        derived_ratio(total, Decimal::from(count))
    }

    /// Value of the last day where the field is non-zero.
    pub fn latest(
        &self,
        series: &DailySeries,
        platform: Platform,
        field: MetricField,
    ) -> Decimal {
        series
            .days
            .iter()
            .rev()
            .map(|row| row.value(platform, field))
            .find(|v| !v.is_zero())
            .unwrap_or(Decimal::ZERO)
    }

    /// Largest single-day value.
    pub fn max(&self, series: &DailySeries, platform: Platform, field: MetricField) -> Decimal {
        series
            .days
            .iter()
            .map(|row| row.value(platform, field))
            .max()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn derived_ratio(&self, numerator: Decimal, denominator: Decimal) -> Decimal {
        derived_ratio(numerator, denominator)
    }

    /// The un-aggregated row for `date`, or a zero row if the series does not cover it.
    pub fn point_in_time(&self, series: &DailySeries, date: NaiveDate) -> DailyRow {
        series
            .day(date)
            .cloned()
            .unwrap_or_else(|| DailyRow::zeroed(date, &series.platforms))
    }

    /// Products summed by name across the series, best revenue first.
    pub fn merge_products(&self, series: &DailySeries) -> Vec<ProductTotal> {
        merge(series.days.iter().flat_map(|row| row.products()))
    }

    /// Products of a single day, best revenue first.
    pub fn merge_products_on(
        &self,
        series: &DailySeries,
        date: NaiveDate,
    ) -> Vec<ProductTotal> {
        match series.day(date) {
            Some(row) => merge(row.products()),
            None => Vec::new(),
        }
    }

    /// Efficiency ratios over the whole series.
    pub fn ratios(&self, series: &DailySeries) -> DerivedRatios {
        let spend = self.sum(series, Platform::FacebookAds, MetricField::Spend);
        let impressions = self.sum(series, Platform::FacebookAds, MetricField::Impressions);
        let clicks = self.sum(series, Platform::FacebookAds, MetricField::Clicks);
        let conversions = self.sum(series, Platform::FacebookAds, MetricField::Conversions);
        let revenue = self.sum(series, Platform::WooCommerce, MetricField::Revenue);
        let orders = self.sum(series, Platform::WooCommerce, MetricField::Orders);

        DerivedRatios {
            ctr: derived_ratio(clicks, impressions).saturating_mul(HUNDRED),
            cpc: derived_ratio(spend, clicks),
            cpm: derived_ratio(spend, impressions).saturating_mul(THOUSAND),
            roas: derived_ratio(revenue, spend),
            aov: derived_ratio(revenue, orders),
            conversion_rate: derived_ratio(conversions, clicks).saturating_mul(HUNDRED),
        }
    }

    /// Builds the full period bundle a view asks for.
    pub fn aggregate_period(
        &self,
        series: &DailySeries,
        spec: &AggregationSpec,
    ) -> AggregatedMetrics {
        let mut report = AggregatedMetrics::new(series.start, series.end);
        report.days = series.len();

        for platform in &spec.platforms {
            for policy in platform.policy().fields {
                let (bucket, value) = match policy.semantics {
                    AggregationSemantics::Sum => {
                        (&mut report.totals, self.sum(series, *platform, policy.field))
                    }
                    AggregationSemantics::Average => {
                        (&mut report.averages, self.average(series, *platform, policy.field))
                    }
                    AggregationSemantics::Latest => {
                        (&mut report.latest, self.latest(series, *platform, policy.field))
                    }
                };
                bucket.entry(*platform).or_default().insert(policy.field, value);
            }
        }

        report.ratios = self.ratios(series);

        let mut products = self.merge_products(series);
        if let Some(limit) = spec.top_products {
            products.truncate(limit);
        }
        report.top_products = products;

        report.first_day = series.first().map(|row| self.day_values(series, row.date, spec));
        report.last_day = series.last().map(|row| self.day_values(series, row.date, spec));
        if let Some(today) = spec.today {
            report.today = Some(self.day_values(series, today, spec));
            let yesterday = today.pred_opt().unwrap_or(today);
            report.yesterday = Some(self.day_values(series, yesterday, spec));
        }

        tracing::debug!(
            start = %report.start,
            end = %report.end,
            days = report.days,
            products = report.top_products.len(),
            "Aggregated period"
        );

        report
    }

    fn day_values(
        &self,
        series: &DailySeries,
        date: NaiveDate,
        spec: &AggregationSpec,
    ) -> DayValues {
        let row = self.point_in_time(series, date);
        let mut values = PlatformValues::new();
        for platform in &spec.platforms {
            let fields = platform
                .policy()
                .fields
                .iter()
                .map(|p| (p.field, row.value(*platform, p.field)))
                .collect();
            values.insert(*platform, fields);
        }

        let mut top_products = merge(row.products());
        if let Some(limit) = spec.top_products {
            top_products.truncate(limit);
        }

        DayValues { date, values, top_products }
    }
}

fn merge<'a>(entries: impl Iterator<Item = &'a ProductEntry>) -> Vec<ProductTotal> {
    let mut by_name: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for entry in entries {
        let slot = by_name.entry(entry.name.as_str()).or_default();
        slot.0 = slot.0.saturating_add(entry.quantity);
        slot.1 = slot.1.saturating_add(entry.revenue);
    }

    let mut totals: Vec<ProductTotal> = by_name
        .into_iter()
        .map(|(name, (quantity, revenue))| ProductTotal {
            name: name.to_string(),
            quantity,
            revenue,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| b.quantity.cmp(&a.quantity))
            .then_with(|| a.name.cmp(&b.name))
    });
    totals
}
