//! One row per reward across the three notches.

use serde::Serialize;
use std::collections::HashMap;

use crate::notch::{NotchDistribution, NotchStats};
use crate::track::{aggregate_optional, TrackPolicy};

/// A reward's statistics at every notch plus its track-wide chance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRow {
    pub reward_id: String,
    /// Indexed by notch - 1; `None` when the notch doesn't offer the reward
    pub per_notch: [Option<NotchStats>; 3],
    /// True if any notch marks the reward once-only
    pub select_once_only: bool,
    pub track_pct: f64,
}

impl MergedRow {
    /// Stats at a 1-based notch
    pub fn notch(&self, notch: u8) -> Option<&NotchStats> {
        self.per_notch
            .get(usize::from(notch).checked_sub(1)?)
            .and_then(Option::as_ref)
    }

    pub fn policy(&self) -> TrackPolicy {
        TrackPolicy::from_once_only(self.select_once_only)
    }
}

/// Fuse three notch distributions into rows keyed by reward id.
///
/// Rows appear in first-seen order (notch 1, then new ids from notch 2, then
/// notch 3) and are then stably sorted by track percentage, highest first.
pub fn merge_rows(
    d1: &NotchDistribution,
    d2: &NotchDistribution,
    d3: &NotchDistribution,
) -> Vec<MergedRow> {
    let mut rows: Vec<MergedRow> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for (slot, dist) in [d1, d2, d3].into_iter().enumerate() {
        for entry in &dist.rows {
            let index = *by_id.entry(entry.reward_id.clone()).or_insert_with(|| {
                rows.push(MergedRow {
                    reward_id: entry.reward_id.clone(),
                    per_notch: [None; 3],
                    select_once_only: false,
                    track_pct: 0.0,
                });
                rows.len() - 1
            });

            let row = &mut rows[index];
            row.per_notch[slot] = Some(entry.stats);
            row.select_once_only |= entry.stats.select_once_only;
        }
    }

    for row in &mut rows {
        let pcts = row
            .per_notch
            .map(|stats| stats.map(|s| s.percent_at_least_one_of_three));
        row.track_pct = aggregate_optional(pcts, row.policy());
    }

    rows.sort_by(|a, b| b.track_pct.total_cmp(&a.track_pct));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, NotchRewardRow};
    use crate::owned::OwnedSet;
    use crate::PCT_EPSILON;

    fn dist(rows: &[NotchRewardRow]) -> NotchDistribution {
        NotchDistribution::build(rows, &Dataset::default(), &OwnedSet::new())
    }

    #[test]
    fn test_absent_notch_is_none() {
        let d1 = dist(&[NotchRewardRow::new("A", 1), NotchRewardRow::new("B", 1)]);
        let d2 = dist(&[NotchRewardRow::new("A", 1)]);
        let d3 = dist(&[]);
        let rows = merge_rows(&d1, &d2, &d3);

        let a = rows.iter().find(|r| r.reward_id == "A").unwrap();
        let b = rows.iter().find(|r| r.reward_id == "B").unwrap();
        assert!(a.notch(1).is_some());
        assert!(a.notch(2).is_some());
        assert!(a.notch(3).is_none());
        assert!(b.notch(2).is_none());
        assert!(b.notch(0).is_none());
        assert!(b.notch(4).is_none());
    }

    #[test]
    fn test_zero_probability_is_distinct_from_absent() {
        let d1 = dist(&[NotchRewardRow::new("A", 0)]);
        let rows = merge_rows(&d1, &dist(&[]), &dist(&[]));
        let stats = rows[0].notch(1).unwrap();
        assert_eq!(stats.percent_single, 0.0);
        assert!(rows[0].notch(2).is_none());
    }

    #[test]
    fn test_track_pct_and_order() {
        // A: 50% single at every notch -> 87.5% per notch, B: 50% at notch 1 only
        let d1 = dist(&[NotchRewardRow::new("B", 1), NotchRewardRow::new("A", 1)]);
        let d2 = dist(&[NotchRewardRow::new("A", 1), NotchRewardRow::new("C", 1)]);
        let d3 = dist(&[NotchRewardRow::new("A", 1), NotchRewardRow::new("C", 1)]);
        let rows = merge_rows(&d1, &d2, &d3);

        let ids: Vec<&str> = rows.iter().map(|r| r.reward_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C", "B"]);

        let a = 100.0 * (1.0 - 0.125f64.powi(3));
        assert!((rows[0].track_pct - a).abs() < PCT_EPSILON);
        assert!((rows[2].track_pct - 87.5).abs() < PCT_EPSILON);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let d1 = dist(&[NotchRewardRow::new("X", 1), NotchRewardRow::new("Y", 1)]);
        let d2 = dist(&[NotchRewardRow::new("Z", 1), NotchRewardRow::new("W", 1)]);
        let rows = merge_rows(&d1, &d2, &dist(&[]));
        let ids: Vec<&str> = rows.iter().map(|r| r.reward_id.as_str()).collect();
        assert_eq!(ids, vec!["X", "Y", "Z", "W"]);
    }

    #[test]
    fn test_once_only_true_wins() {
        let d1 = dist(&[NotchRewardRow::new("A", 1)]);
        let d2 = dist(&[NotchRewardRow::once_only("A", 1)]);
        let rows = merge_rows(&d1, &d2, &dist(&[]));
        assert!(rows[0].select_once_only);
        assert_eq!(rows[0].policy(), TrackPolicy::OnceOnly);
        assert!(!rows[0].notch(1).unwrap().select_once_only);
    }
}
