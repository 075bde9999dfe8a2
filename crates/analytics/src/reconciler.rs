use chrono::{DateTime, NaiveDate, Utc};
use core_types::{Platform, PlatformMetrics, Snapshot};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The grouping key of reconciliation: one calendar day of one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DayKey {
    pub date: NaiveDate,
    pub platform: Platform,
}

impl DayKey {
    pub fn new(date: NaiveDate, platform: Platform) -> Self {
        Self { date, platform }
    }
}

/// The single canonical value chosen for a (date, platform) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledDay {
    pub date: NaiveDate,
    pub platform: Platform,
    pub metrics: PlatformMetrics,
    /// The snapshot the metrics were taken from.
    pub source_snapshot: Uuid,
    pub created_at: DateTime<Utc>,
    /// How many snapshots competed for this slot, including the winner.
    pub duplicates: usize,
}

pub type ReconciledMap = BTreeMap<DayKey, ReconciledDay>;

/// Collapses overlapping sync output into one snapshot per day and platform.
///
/// Within a group the snapshot with the largest policy indicator wins (revenue for
/// commerce, spend for ads, ...). Ties go to the latest `created_at`, then to the
/// largest snapshot id, so the result never depends on input order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reconciler {}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles one client's snapshots. Pairs with no snapshot get no entry.
    pub fn reconcile(&self, snapshots: &[Snapshot]) -> ReconciledMap {
        let mut winners: BTreeMap<DayKey, (&Snapshot, usize)> = BTreeMap::new();

        for snapshot in snapshots {
            let key = DayKey::new(snapshot.date, snapshot.platform());
            match winners.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert((snapshot, 1));
                }
                Entry::Occupied(mut slot) => {
                    let (current, count) = slot.get_mut();
                    *count += 1;
                    if rank(snapshot) > rank(*current) {
                        *current = snapshot;
                    }
                }
            }
        }

        winners
            .into_iter()
            .map(|(key, (winner, duplicates))| {
                if duplicates > 1 {
                    tracing::debug!(
                        date = %key.date,
                        platform = %key.platform,
                        style = ?key.platform.policy().style,
                        duplicates,
                        winner = %winner.id,
                        "Collapsed duplicate snapshots"
                    );
                }
                let day = ReconciledDay {
                    date: key.date,
                    platform: key.platform,
                    metrics: winner.metrics.clone(),
                    source_snapshot: winner.id,
                    created_at: winner.created_at,
                    duplicates,
                };
                (key, day)
            })
            .collect()
    }

    /// Reconciles only the snapshots belonging to `platforms`.
    pub fn reconcile_for(&self, snapshots: &[Snapshot], platforms: &[Platform]) -> ReconciledMap {
        let wanted: Vec<Snapshot> = snapshots
            .iter()
            .filter(|s| platforms.contains(&s.platform()))
            .cloned()
            .collect();
        self.reconcile(&wanted)
    }
}

/// Total order used to pick a group's winner.
fn rank(snapshot: &Snapshot) -> (Decimal, DateTime<Utc>, Uuid) {
    let policy = snapshot.platform().policy();
    (
        policy.indicator_value(&snapshot.metrics),
        snapshot.created_at,
        snapshot.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::MetricField;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn snapshot(
        platform: Platform,
        date: NaiveDate,
        created: DateTime<Utc>,
        fields: &[(MetricField, Decimal)],
    ) -> Snapshot {
        let mut metrics = PlatformMetrics::empty(platform);
        for (field, value) in fields {
            metrics.set(*field, *value);
        }
        Snapshot {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            integration_id: Uuid::new_v4(),
            metric_type: "daily".to_string(),
            date,
            metrics,
            created_at: created,
        }
    }

    #[test]
    fn woocommerce_keeps_largest_revenue() {
        let low = snapshot(
            Platform::WooCommerce,
            day(1),
            at(12),
            &[(MetricField::Revenue, dec!(120))],
        );
        let high = snapshot(
            Platform::WooCommerce,
            day(1),
            at(9),
            &[(MetricField::Revenue, dec!(150))],
        );
        let map = Reconciler::new().reconcile(&[low, high.clone()]);

        let chosen = &map[&DayKey::new(day(1), Platform::WooCommerce)];
        assert_eq!(chosen.source_snapshot, high.id);
        assert_eq!(chosen.metrics.value(MetricField::Revenue), dec!(150));
        assert_eq!(chosen.duplicates, 2);
    }

    #[test]
    fn facebook_keeps_largest_spend() {
        let low = snapshot(Platform::FacebookAds, day(1), at(1), &[(MetricField::Spend, dec!(40))]);
        let high = snapshot(
            Platform::FacebookAds,
            day(1),
            at(2),
            &[(MetricField::Spend, dec!(55))],
        );
        let map = Reconciler::new().reconcile(&[high.clone(), low]);

        let chosen = &map[&DayKey::new(day(1), Platform::FacebookAds)];
        assert_eq!(chosen.metrics.value(MetricField::Spend), dec!(55));
        assert_eq!(chosen.source_snapshot, high.id);
    }

    #[test]
    fn equal_indicators_go_to_latest_sync() {
        let early = snapshot(
            Platform::WooCommerce,
            day(2),
            at(6),
            &[(MetricField::Revenue, dec!(80)), (MetricField::Orders, dec!(2))],
        );
        let late = snapshot(
            Platform::WooCommerce,
            day(2),
            at(18),
            &[(MetricField::Revenue, dec!(80)), (MetricField::Orders, dec!(3))],
        );
        let forward = Reconciler::new().reconcile(&[early.clone(), late.clone()]);
        let backward = Reconciler::new().reconcile(&[late.clone(), early]);

        let key = DayKey::new(day(2), Platform::WooCommerce);
        assert_eq!(forward[&key].source_snapshot, late.id);
        assert_eq!(forward, backward);
    }

    #[test]
    fn missing_indicator_counts_as_zero() {
        let blank = snapshot(Platform::WooCommerce, day(3), at(23), &[]);
        let real = snapshot(
            Platform::WooCommerce,
            day(3),
            at(1),
            &[(MetricField::Revenue, dec!(10))],
        );
        let map = Reconciler::new().reconcile(&[blank, real.clone()]);
        assert_eq!(map[&DayKey::new(day(3), Platform::WooCommerce)].source_snapshot, real.id);
    }

    #[test]
    fn result_is_order_independent_and_one_per_pair() {
        let mut snapshots = vec![
            snapshot(Platform::FacebookAds, day(1), at(1), &[(MetricField::Spend, dec!(5))]),
            snapshot(Platform::FacebookAds, day(1), at(2), &[(MetricField::Spend, dec!(5))]),
            snapshot(Platform::FacebookAds, day(1), at(2), &[(MetricField::Spend, dec!(5))]),
            snapshot(
                Platform::FacebookAds,
                day(2),
                at(1),
                &[(MetricField::Impressions, dec!(100))],
            ),
            snapshot(Platform::WooCommerce, day(1), at(3), &[(MetricField::Revenue, dec!(7))]),
            snapshot(
                Platform::GoogleAnalytics,
                day(2),
                at(3),
                &[(MetricField::Sessions, dec!(70))],
            ),
            snapshot(
                Platform::GoogleAnalytics,
                day(2),
                at(4),
                &[(MetricField::Sessions, dec!(71))],
            ),
        ];
        let reconciler = Reconciler::new();
        let baseline = reconciler.reconcile(&snapshots);
        assert_eq!(baseline.len(), 4);

        for _ in 0..snapshots.len() {
            snapshots.rotate_left(1);
            assert_eq!(reconciler.reconcile(&snapshots), baseline);
        }
        snapshots.reverse();
        assert_eq!(reconciler.reconcile(&snapshots), baseline);
        // Reconciling twice changes nothing.
        assert_eq!(reconciler.reconcile(&snapshots), reconciler.reconcile(&snapshots));
    }

    #[test]
    fn absent_pairs_are_not_synthesized() {
        let map = Reconciler::new().reconcile(&[]);
        assert!(map.is_empty());

        let only = snapshot(
            Platform::MailerLite,
            day(4),
            at(1),
            &[(MetricField::EmailsSent, dec!(3))],
        );
        let map = Reconciler::new().reconcile(&[only]);
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&DayKey::new(day(4), Platform::WordPress)));
    }

    #[test]
    fn reconcile_for_drops_other_platforms() {
        let fb = snapshot(Platform::FacebookAds, day(1), at(1), &[(MetricField::Spend, dec!(5))]);
        let woo = snapshot(
            Platform::WooCommerce,
            day(1),
            at(1),
            &[(MetricField::Revenue, dec!(5))],
        );
        let map = Reconciler::new().reconcile_for(&[fb, woo], &[Platform::WooCommerce]);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&DayKey::new(day(1), Platform::WooCommerce)));
    }
}
