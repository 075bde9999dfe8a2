use crate::aggregator::{derived_ratio, Aggregator};
use crate::error::AnalyticsError;
use crate::series::DailySeries;
use chrono::NaiveDate;
use core_types::{Goal, GoalMetric, MetricField, Platform};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use uuid::Uuid;

/// A goal is on track while progress stays within 10% of the time-based expectation.
pub const ON_TRACK_TOLERANCE: Decimal = dec!(0.90);

/// Progress, pacing and profit of one goal on one day. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub metric_type: GoalMetric,
    pub target_value: Decimal,
    pub current_value: Decimal,

    // I. Progress and pacing
    /// Not clamped: an over-achieved goal reports more than 100.
    pub progress_percentage: Decimal,
    pub expected_progress: Decimal,
    pub is_on_track: bool,
    /// Advisory only; the persisted goal status is never touched.
    pub is_complete: bool,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub daily_target: Decimal,
    pub today_change: Decimal,

    // II. Spend and profit
    pub facebook_spend: Decimal,
    /// `current_value / facebook_spend` whatever the goal measures.
    pub roas: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,

    // III. Run-rate projection
    pub projected_value: Decimal,
    pub projected_net_profit: Decimal,
}

/// Computes [`GoalProgress`] from a goal, its series and the client's fixed costs.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoalProgressEngine {
    aggregator: Aggregator,
}

impl GoalProgressEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Arguments
    ///
    /// * `goal` - The goal definition. `target_value` must be positive and the window non-inverted.
    /// * `series` - Reconciled daily series holding the goal's metric; days outside the goal
    ///   window are ignored.
    /// * `facebook_series` - Series holding Facebook Ads spend over (at least) the same window.
    /// * `monthly_expenses` - The client's fixed operating cost, subtracted from gross profit.
    /// * `today` - The evaluation day.
    pub fn compute_progress(
        &self,
        goal: &Goal,
        series: &DailySeries,
        facebook_series: &DailySeries,
        monthly_expenses: Decimal,
        today: NaiveDate,
    ) -> Result<GoalProgress, AnalyticsError> {
        validate(goal)?;

        let window = series.slice(goal.start_date, goal.end_date);
        let facebook_window = facebook_series.slice(goal.start_date, goal.end_date);

        let current_value = self.current_value(goal.metric_type, &window, &facebook_window);
        let facebook_spend =
            self.aggregator.sum(&facebook_window, Platform::FacebookAds, MetricField::Spend);

        let progress_percentage =
            derived_ratio(current_value, goal.target_value).saturating_mul(Decimal::ONE_HUNDRED);

        let total_days = (goal.end_date - goal.start_date).num_days();
        let days_elapsed = (today - goal.start_date).num_days().clamp(0, total_days);
        let days_remaining = (goal.end_date - today).num_days().max(0);

        let expected_progress = if total_days > 0 {
            derived_ratio(Decimal::from(days_elapsed), Decimal::from(total_days))
                .saturating_mul(Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };
        let is_on_track =
            progress_percentage >= expected_progress.saturating_mul(ON_TRACK_TOLERANCE);

        let daily_target = if days_remaining > 0 {
            let remaining = goal.target_value.saturating_sub(current_value).max(Decimal::ZERO);
            derived_ratio(remaining, Decimal::from(days_remaining))
        } else {
            Decimal::ZERO
        };

        let gross_profit = current_value.saturating_sub(facebook_spend);
        let net_profit = gross_profit.saturating_sub(monthly_expenses);

        let projected_value = match goal.metric_type {
            GoalMetric::Revenue | GoalMetric::Orders | GoalMetric::Conversions => {
                run_rate(current_value, days_elapsed, total_days)
            }
            GoalMetric::Products | GoalMetric::Roas | GoalMetric::Custom => current_value,
        };
        let projected_spend = run_rate(facebook_spend, days_elapsed, total_days);
        let projected_net_profit = projected_value
            .saturating_sub(projected_spend)
            .saturating_sub(monthly_expenses);

        let progress = GoalProgress {
            goal_id: goal.id,
            metric_type: goal.metric_type,
            target_value: goal.target_value,
            current_value,
            progress_percentage,
            expected_progress,
            is_on_track,
            is_complete: progress_percentage >= Decimal::ONE_HUNDRED,
            total_days,
            days_elapsed,
            days_remaining,
            daily_target,
            today_change: self.today_change(goal.metric_type, &window, &facebook_window, today),
            facebook_spend,
            roas: derived_ratio(current_value, facebook_spend),
            gross_profit,
            net_profit,
            projected_value,
            projected_net_profit,
        };

        tracing::debug!(
            goal = %goal.id,
            metric = goal.metric_type.as_str(),
            current = %progress.current_value,
            progress = %progress.progress_percentage,
            expected = %progress.expected_progress,
            on_track = progress.is_on_track,
            "Computed goal progress"
        );

        Ok(progress)
    }

    fn current_value(
        &self,
        metric: GoalMetric,
        window: &DailySeries,
        facebook_window: &DailySeries,
    ) -> Decimal {
        match metric {
            GoalMetric::Revenue | GoalMetric::Orders | GoalMetric::Conversions => {
                match metric.source() {
                    Some((platform, field)) => self.aggregator.sum(window, platform, field),
                    None => Decimal::ZERO,
                }
            }
            // A day's product count is already distinct, so the window takes the best day.
            GoalMetric::Products => match metric.source() {
                Some((platform, field)) => self.aggregator.max(window, platform, field),
                None => Decimal::ZERO,
            },
            GoalMetric::Roas => derived_ratio(
                self.aggregator.sum(window, Platform::WooCommerce, MetricField::Revenue),
                self.aggregator.sum(facebook_window, Platform::FacebookAds, MetricField::Spend),
            ),
            GoalMetric::Custom => Decimal::ZERO,
        }
    }

    /// The goal metric's own value on `today`, zero outside the goal window.
    fn today_change(
        &self,
        metric: GoalMetric,
        window: &DailySeries,
        facebook_window: &DailySeries,
        today: NaiveDate,
    ) -> Decimal {
        let row = self.aggregator.point_in_time(window, today);
        match metric {
            GoalMetric::Roas => {
                let spend = self
                    .aggregator
                    .point_in_time(facebook_window, today)
                    .value(Platform::FacebookAds, MetricField::Spend);
                derived_ratio(row.value(Platform::WooCommerce, MetricField::Revenue), spend)
            }
            _ => match metric.source() {
                Some((platform, field)) => row.value(platform, field),
                None => Decimal::ZERO,
            },
        }
    }
}

fn validate(goal: &Goal) -> Result<(), AnalyticsError> {
    if goal.target_value <= Decimal::ZERO {
        return Err(AnalyticsError::InvalidArgument(format!(
            "goal {} has non-positive target {}",
            goal.id, goal.target_value
        )));
    }
    if goal.end_date < goal.start_date {
        return Err(AnalyticsError::InvalidArgument(format!(
            "goal {} ends {} before it starts {}",
            goal.id, goal.end_date, goal.start_date
        )));
    }
    Ok(())
}

/// Linear extrapolation of `value` observed over `elapsed` days to `total` days.
///
/// Saturates rather than overflowing.
fn run_rate(value: Decimal, elapsed: i64, total: i64) -> Decimal {
    if elapsed <= 0 {
        return Decimal::ZERO;
    }
    derived_ratio(value, Decimal::from(elapsed)).saturating_mul(Decimal::from(total))
}
