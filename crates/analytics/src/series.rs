use crate::error::AnalyticsError;
use crate::reconciler::{DayKey, ReconciledMap};
use chrono::NaiveDate;
use core_types::{MetricField, Platform, PlatformMetrics, ProductEntry};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One calendar day of a [`DailySeries`], holding a cell for every requested platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub cells: BTreeMap<Platform, PlatformMetrics>,
    /// Platforms that had a reconciled snapshot for this day. The rest are zero-filled.
    pub observed: BTreeSet<Platform>,
}

impl DailyRow {
    /// A row with an empty (all-zero) cell for each platform.
    pub fn zeroed(date: NaiveDate, platforms: &[Platform]) -> Self {
        Self {
            date,
            cells: platforms.iter().map(|p| (*p, PlatformMetrics::empty(*p))).collect(),
            observed: BTreeSet::new(),
        }
    }

    pub fn metrics(&self, platform: Platform) -> Option<&PlatformMetrics> {
        self.cells.get(&platform)
    }

    pub fn value(&self, platform: Platform, field: MetricField) -> Decimal {
        self.cells
            .get(&platform)
            .map(|m| m.value(field))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn has_data(&self, platform: Platform) -> bool {
        self.observed.contains(&platform)
    }

    /// Product lines across all platforms of the day.
    pub fn products(&self) -> impl Iterator<Item = &ProductEntry> {
        self.cells.values().flat_map(|m| m.products().iter())
    }
}

/// A dense, ascending, one-row-per-day view over `[start, end]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub platforms: Vec<Platform>,
    pub days: Vec<DailyRow>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyRow> {
        if date < self.start || date > self.end {
            return None;
        }
        let offset = (date - self.start).num_days() as usize;
        self.days.get(offset).filter(|row| row.date == date)
    }

    pub fn first(&self) -> Option<&DailyRow> {
        self.days.first()
    }

    pub fn last(&self) -> Option<&DailyRow> {
        self.days.last()
    }

    /// The rows falling inside `[start, end]`.
    ///
    /// Days outside this series are not synthesized, so the result may be shorter than
    /// the requested range or empty.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> DailySeries {
        DailySeries {
            start: start.max(self.start),
            end: end.min(self.end),
            platforms: self.platforms.clone(),
            days: self
                .days
                .iter()
                .filter(|row| row.date >= start && row.date <= end)
                .cloned()
                .collect(),
        }
    }

    /// The same days carrying only `platform`'s cells.
    pub fn restrict_to(&self, platform: Platform) -> DailySeries {
        let platforms: Vec<Platform> =
            self.platforms.iter().copied().filter(|p| *p == platform).collect();
        DailySeries {
            start: self.start,
            end: self.end,
            days: self
                .days
                .iter()
                .map(|row| DailyRow {
                    date: row.date,
                    cells: row
                        .cells
                        .iter()
                        .filter(|(p, _)| **p == platform)
                        .map(|(p, m)| (*p, m.clone()))
                        .collect(),
                    observed: row.observed.iter().copied().filter(|p| *p == platform).collect(),
                })
                .collect(),
            platforms,
        }
    }

    /// The export layout: `date`, then each platform's tracked fields in policy order.
    pub fn table(&self) -> SeriesTable {
        let columns: Vec<(Platform, MetricField)> = self
            .platforms
            .iter()
            .flat_map(|p| p.policy().fields.iter().map(move |f| (*p, f.field)))
            .collect();

        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push("date".to_string());
        header.extend(columns.iter().map(|(p, f)| format!("{}_{}", p.as_str(), f.as_str())));

        let rows = self
            .days
            .iter()
            .map(|row| SeriesTableRow {
                date: row.date,
                values: columns.iter().map(|(p, f)| row.value(*p, *f)).collect(),
            })
            .collect();

        SeriesTable { header, rows }
    }
}

/// A flat, column-ordered rendering of a series for tabular consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTable {
    pub header: Vec<String>,
    pub rows: Vec<SeriesTableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTableRow {
    pub date: NaiveDate,
    pub values: Vec<Decimal>,
}

/// Expands a reconciled map into a zero-filled [`DailySeries`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DailySeriesBuilder {}

impl DailySeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds exactly one row per day of `[start, end]`, however sparse `reconciled` is.
    ///
    /// Platforms are deduplicated and kept in declaration order.
    pub fn build(
        &self,
        reconciled: &ReconciledMap,
        start: NaiveDate,
        end: NaiveDate,
        platforms: &[Platform],
    ) -> Result<DailySeries, AnalyticsError> {
        if end < start {
            return Err(AnalyticsError::InvalidArgument(format!(
                "series end {end} is before start {start}"
            )));
        }

        let mut platforms = platforms.to_vec();
        platforms.sort();
        platforms.dedup();

        let days = start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| {
                let mut row = DailyRow::zeroed(date, &platforms);
                for platform in &platforms {
                    if let Some(day) = reconciled.get(&DayKey::new(date, *platform)) {
                        row.cells.insert(*platform, day.metrics.clone());
                        row.observed.insert(*platform);
                    }
                }
                row
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            %start,
            %end,
            days = days.len(),
            platforms = platforms.len(),
            "Built daily series"
        );

        Ok(DailySeries { start, end, platforms, days })
    }
}

/// First and last day of a calendar month, for month-shaped exports.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
    core_types::month_bounds(year, month)
        .map_err(|e| AnalyticsError::InvalidArgument(e.to_string()))
}
