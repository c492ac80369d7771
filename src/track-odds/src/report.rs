//! Full reward table for one player/track level.

use serde::Serialize;

use crate::dataset::{DataSource, Levels, NOTCHES};
use crate::merge::{merge_rows, MergedRow};
use crate::notch::NotchDistribution;
use crate::owned::OwnedLookup;
use crate::tier::{parse_gear_score, ConditionFallback, Resolver, NO_GEAR_SCORE_RANGE};

/// A merged reward row with its display metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRow {
    #[serde(flatten)]
    pub merged: MergedRow,
    pub display_name: String,
    /// Gear score range of the reward's loot table, or the "—" sentinel
    pub gear_score: String,
    pub gs_min: u32,
    pub gs_max: u32,
    pub cost: Option<i64>,
    pub rarity: String,
    pub unique_eligible: bool,
    pub roll_on_present: bool,
    pub loot_table_id: Option<String>,
    pub direct_bucket_id: Option<String>,
}

impl RewardRow {
    pub fn reward_id(&self) -> &str {
        &self.merged.reward_id
    }
}

/// The three notch distributions of a track level and their merged rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReport {
    pub levels: Levels,
    /// Indexed by notch - 1
    pub notches: [NotchDistribution; 3],
    /// Highest track percentage first
    pub rows: Vec<RewardRow>,
}

impl TrackReport {
    /// Build the report for `levels`, leaving owned unique rewards out.
    ///
    /// The owned set is read once for the whole build.
    pub fn build<D, O>(data: &D, owned: &O, levels: Levels, fallback: ConditionFallback) -> Self
    where
        D: DataSource + ?Sized,
        O: OwnedLookup + ?Sized,
    {
        let notches =
            NOTCHES.map(|notch| NotchDistribution::for_level(data, owned, levels.track, notch));
        let [d1, d2, d3] = &notches;

        let resolver = Resolver::with_fallback(data, fallback);
        let rows: Vec<RewardRow> = merge_rows(d1, d2, d3)
            .into_iter()
            .map(|merged| enrich(&resolver, levels, merged))
            .collect();

        tracing::debug!(
            levels = %levels,
            rewards = rows.len(),
            n1 = d1.total_weight,
            n2 = d2.total_weight,
            n3 = d3.total_weight,
            "built track report"
        );

        Self {
            levels,
            notches,
            rows,
        }
    }

    /// Distinct reward ids offered across the three notches
    pub fn unique_reward_count(&self) -> usize {
        self.rows.len()
    }

    /// Total pool weight of a 1-based notch
    pub fn total_weight(&self, notch: u8) -> Option<u64> {
        let index = usize::from(notch).checked_sub(1)?;
        self.notches.get(index).map(|d| d.total_weight)
    }

    pub fn find(&self, reward_id: &str) -> Option<&RewardRow> {
        self.rows.iter().find(|row| row.reward_id() == reward_id)
    }
}

fn enrich<D: DataSource + ?Sized>(
    resolver: &Resolver<'_, D>,
    levels: Levels,
    merged: MergedRow,
) -> RewardRow {
    let meta = resolver.data().reward(&merged.reward_id);

    let display_name = meta
        .and_then(|m| {
            [m.name.as_str(), m.raw_item.as_str()]
                .into_iter()
                .map(str::trim)
                .find(|s| !s.is_empty())
        })
        .unwrap_or(&merged.reward_id)
        .to_string();

    let loot_table_id = meta
        .and_then(|m| m.loot_table_id.clone())
        .filter(|id| !id.is_empty());

    let gear_score = match &loot_table_id {
        Some(table) => resolver.resolve_gear_score_range(table, levels),
        None => NO_GEAR_SCORE_RANGE.to_string(),
    };
    let (gs_min, gs_max) = parse_gear_score(&gear_score);

    RewardRow {
        display_name,
        gs_min,
        gs_max,
        gear_score,
        cost: meta.and_then(|m| m.buy_cost),
        rarity: meta.map(|m| m.rarity.clone()).unwrap_or_default(),
        unique_eligible: meta.is_some_and(|m| m.unique_eligible),
        roll_on_present: meta.is_some_and(|m| m.roll_on_present),
        loot_table_id,
        direct_bucket_id: meta
            .and_then(|m| m.direct_bucket_id.clone())
            .filter(|id| !id.is_empty()),
        merged,
    }
}
