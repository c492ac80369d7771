//! Single-notch reward distribution.

use serde::Serialize;

use crate::dataset::{DataSource, NotchRewardRow};
use crate::owned::OwnedLookup;

/// Draws a notch is assumed to repeat for the at-least-once estimate
pub const DRAWS_PER_NOTCH: i32 = 3;

/// Chance of at least one success in `draws` independent draws of `p`
pub fn at_least_once(p: f64, draws: i32) -> f64 {
    1.0 - (1.0 - p).powi(draws)
}

/// Weight and percentages of one reward at one notch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotchStats {
    pub weight: u64,
    pub percent_single: f64,
    pub percent_at_least_one_of_three: f64,
    pub select_once_only: bool,
}

/// One eligible reward of a notch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotchEntry {
    pub reward_id: String,
    #[serde(flatten)]
    pub stats: NotchStats,
}

/// Normalized distribution of one notch after the owned filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotchDistribution {
    /// Sum of the weights still in the pool, saturating at `u64::MAX`
    pub total_weight: u64,
    /// Ordered by `percent_at_least_one_of_three`, highest first
    pub rows: Vec<NotchEntry>,
}

impl NotchDistribution {
    /// Filter owned unique rewards out of `rows` and normalize the rest.
    ///
    /// The at-least-once figure treats the notch as drawn three times with
    /// replacement from the same filtered pool.
    pub fn build<D, O>(rows: &[NotchRewardRow], data: &D, owned: &O) -> Self
    where
        D: DataSource + ?Sized,
        O: OwnedLookup + ?Sized,
    {
        let kept: Vec<&NotchRewardRow> = rows
            .iter()
            .filter(|row| !row.reward_id.is_empty())
            .filter(|row| {
                let unique = data
                    .reward(&row.reward_id)
                    .is_some_and(|meta| meta.unique_eligible);
                !(unique && owned.contains(&row.reward_id))
            })
            .collect();

        let pool: u128 = kept.iter().map(|row| u128::from(row.weight)).sum();
        let total_weight = u64::try_from(pool).unwrap_or(u64::MAX);
        if pool == 0 && !kept.is_empty() {
            tracing::debug!(rows = kept.len(), "notch pool has zero total weight");
        }

        let mut entries: Vec<NotchEntry> = kept
            .into_iter()
            .map(|row| {
                let (single, any) = if pool > 0 {
                    let p = row.weight as f64 / pool as f64;
                    (p * 100.0, at_least_once(p, DRAWS_PER_NOTCH) * 100.0)
                } else {
                    (0.0, 0.0)
                };
                NotchEntry {
                    reward_id: row.reward_id.clone(),
                    stats: NotchStats {
                        weight: row.weight,
                        percent_single: single,
                        percent_at_least_one_of_three: any,
                        select_once_only: row.select_once_only,
                    },
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.stats
                .percent_at_least_one_of_three
                .total_cmp(&a.stats.percent_at_least_one_of_three)
        });

        Self {
            total_weight,
            rows: entries,
        }
    }

    /// Distribution of one notch of a track level, straight from the dataset
    pub fn for_level<D, O>(data: &D, owned: &O, track_level: u32, notch: u8) -> Self
    where
        D: DataSource + ?Sized,
        O: OwnedLookup + ?Sized,
    {
        Self::build(&data.notch_rows(track_level, notch), data, owned)
    }

    pub fn get(&self, reward_id: &str) -> Option<&NotchEntry> {
        self.rows.iter().find(|row| row.reward_id == reward_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
