//! Bucket-level and item-level drill-down of a reward.
//!
//! A reward that rolls on a loot table spreads its per-notch chances over
//! the buckets of the table's effective model; a bucket spreads its chances
//! evenly over the items eligible at the player's level.

use serde::Serialize;
use std::collections::HashMap;

use crate::dataset::{BucketItem, DataSource, Levels, Quantity, MAX_PLAYER_LEVEL};
use crate::effective::EffectiveModel;
use crate::notch::NotchStats;
use crate::split::split_probabilities;
use crate::tier::{Resolver, VisitChain};
use crate::track::{aggregate_optional, TrackPolicy};

const BUCKET_PREFIX: &str = "[LBID]";
const TABLE_PREFIX: &str = "[LTID]";
const LEVEL_TAG: &str = "level:";

/// Bucket name of a content entry (strips a leading `[LBID]`)
pub fn bucket_name(raw: &str) -> &str {
    raw.strip_prefix(BUCKET_PREFIX).unwrap_or(raw)
}

/// Loot table name of a content entry (strips a leading `[LTID]`)
pub fn table_name(raw: &str) -> &str {
    raw.strip_prefix(TABLE_PREFIX).unwrap_or(raw)
}

/// Parse a `Level:min[-max]` tag. Tags that don't fit the pattern are None.
fn level_range(tag: &str) -> Option<(u32, u32)> {
    let prefix = tag.get(..LEVEL_TAG.len())?;
    if !prefix.eq_ignore_ascii_case(LEVEL_TAG) {
        return None;
    }

    let rest = &tag[LEVEL_TAG.len()..];
    let (lo, hi) = match rest.split_once('-') {
        Some((lo, hi)) => (lo, Some(hi)),
        None => (rest, None),
    };

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(lo) || hi.is_some_and(|h| !digits(h)) {
        return None;
    }

    let min = lo.parse().ok()?;
    let max = match hi {
        Some(h) => h.parse().ok()?,
        None => MAX_PLAYER_LEVEL,
    };
    Some((min, max))
}

/// Whether every level tag of an item admits `level`.
///
/// Non-level tags and malformed level tags don't restrict anything.
pub fn tags_match_level(tags: &[String], level: u32) -> bool {
    tags.iter()
        .filter_map(|tag| level_range(tag))
        .all(|(min, max)| (min..=max).contains(&level))
}

/// Items of a bucket that can drop at `level`
pub fn eligible_items(items: &[BucketItem], level: u32) -> Vec<&BucketItem> {
    items
        .iter()
        .filter(|item| tags_match_level(&item.tags, level))
        .collect()
}

/// Chances of a bucket (or item) at one notch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketNotch {
    /// Chance given the parent reward was drawn
    pub bucket_pct: f64,
    /// Chance on a single draw of the notch
    pub mono_pct: f64,
    /// Chance over the notch's three draws
    pub at_least_pct: f64,
}

/// A bucket of a loot table merged across the notches
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRow {
    pub bucket_name: String,
    pub qty: Option<Quantity>,
    pub min_roll: i64,
    pub per_notch: [Option<BucketNotch>; 3],
    pub track_pct: f64,
}

/// Effective model of a reward's loot table and its buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LootBreakdown {
    pub model: EffectiveModel,
    /// Highest track percentage first
    pub buckets: Vec<BucketRow>,
}

/// Spread a reward's per-notch chances over the buckets of its loot table.
///
/// `parent` holds the reward's stats at notches 1-3; notches that don't
/// offer the reward are skipped. Entries naming the same bucket add up.
pub fn loot_breakdown<D: DataSource + ?Sized>(
    resolver: &Resolver<'_, D>,
    table_id: &str,
    levels: Levels,
    parent: &[Option<NotchStats>; 3],
    policy: TrackPolicy,
) -> LootBreakdown {
    let model = resolver.build_effective_model(table_id, levels, &VisitChain::root());

    let mut buckets: Vec<BucketRow> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (slot, stats) in parent.iter().enumerate() {
        let Some(stats) = stats else { continue };
        let shares = split_probabilities(
            &model,
            stats.percent_single,
            stats.percent_at_least_one_of_three,
        );

        for share in shares {
            let name = bucket_name(&share.entry.raw);
            if name.is_empty() {
                continue;
            }

            let index = *by_name.entry(name.to_string()).or_insert_with(|| {
                buckets.push(BucketRow {
                    bucket_name: name.to_string(),
                    qty: share.entry.qty.clone(),
                    min_roll: share.entry.min_roll,
                    per_notch: [None; 3],
                    track_pct: 0.0,
                });
                buckets.len() - 1
            });

            let cell = buckets[index].per_notch[slot].get_or_insert(BucketNotch {
                bucket_pct: 0.0,
                mono_pct: 0.0,
                at_least_pct: 0.0,
            });
            cell.bucket_pct += share.bucket_pct;
            cell.mono_pct += share.mono_global_pct;
            cell.at_least_pct += share.at_least_global_pct;
        }
    }

    for row in &mut buckets {
        row.track_pct = track_pct(&row.per_notch, policy);
    }
    buckets.sort_by(|a, b| b.track_pct.total_cmp(&a.track_pct));

    tracing::debug!(
        table = table_id,
        model = %model.table_id,
        buckets = buckets.len(),
        "loot breakdown"
    );

    LootBreakdown { model, buckets }
}

/// A final item of a bucket with its share of the bucket's chances
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub item_id: String,
    pub display_name: String,
    pub rarity: String,
    pub qty: Option<Quantity>,
    pub per_notch: [Option<BucketNotch>; 3],
    pub track_pct: f64,
}

/// Divide a bucket's per-notch chances evenly among its eligible items
pub fn bucket_items(
    items: &[&BucketItem],
    per_notch: &[Option<BucketNotch>; 3],
    policy: TrackPolicy,
) -> Vec<ItemRow> {
    let n = items.len() as f64;

    let mut rows: Vec<ItemRow> = items
        .iter()
        .map(|item| {
            let per_notch = per_notch.map(|cell| {
                cell.map(|b| BucketNotch {
                    bucket_pct: b.bucket_pct / n,
                    mono_pct: b.mono_pct / n,
                    at_least_pct: b.at_least_pct / n,
                })
            });
            ItemRow {
                item_id: item.item_id.clone(),
                display_name: item.name().to_string(),
                rarity: item.rarity.clone(),
                qty: item.qty.clone(),
                track_pct: track_pct(&per_notch, policy),
                per_notch,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.track_pct.total_cmp(&a.track_pct));
    rows
}

/// Per-notch chances of a reward that grants a bucket directly
pub fn direct_bucket_notches(parent: &[Option<NotchStats>; 3]) -> [Option<BucketNotch>; 3] {
    parent.map(|stats| {
        stats.map(|s| BucketNotch {
            bucket_pct: 100.0,
            mono_pct: s.percent_single,
            at_least_pct: s.percent_at_least_one_of_three,
        })
    })
}

fn track_pct(per_notch: &[Option<BucketNotch>; 3], policy: TrackPolicy) -> f64 {
    aggregate_optional(per_notch.map(|cell| cell.map(|b| b.at_least_pct)), policy)
}
