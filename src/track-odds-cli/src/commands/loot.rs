//! Loot table, bucket and gear score command handlers

use anyhow::{bail, Context, Result};
use serde::Serialize;
use track_odds::{
    bucket_items, bucket_name, direct_bucket_notches, eligible_items, loot_breakdown, table_name,
    BucketNotch, DataSource, ItemRow, Levels, Resolver, RewardRow, TrackPolicy, TrackReport,
};

use super::{fallback, pct_cell, Session};
use crate::cli::LevelArgs;

fn find_reward(session: &Session, args: &LevelArgs, reward_id: &str) -> Result<(Levels, RewardRow)> {
    let levels = session.levels(args);
    let report = TrackReport::build(&session.data, &session.owned, levels, fallback(args));

    let row = report.find(reward_id).cloned().with_context(|| {
        format!(
            "Reward '{}' is not offered at track level {} (or is owned)",
            reward_id, levels.track
        )
    })?;
    Ok((levels, row))
}

/// Handle the loot command
pub fn loot(session: &Session, reward_id: &str, args: &LevelArgs, json: bool) -> Result<()> {
    let (levels, row) = find_reward(session, args, reward_id)?;
    let policy = row.merged.policy();

    if let Some(table_id) = row.loot_table_id.as_deref() {
        let resolver = Resolver::with_fallback(&session.data, fallback(args));
        let breakdown = loot_breakdown(&resolver, table_id, levels, &row.merged.per_notch, policy);

        if json {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
            return Ok(());
        }

        println!("{} ({})  |  {}", row.display_name, row.reward_id(), levels);
        println!(
            "Loot table {} [{} / {}] max roll {}  |  GS {}\n",
            breakdown.model.table_id,
            breakdown.model.mode,
            breakdown.model.rule,
            breakdown.model.max_roll,
            row.gear_score
        );
        println!(
            "{:<32} {:>6} {:>8} {:>9} {:>9} {:>9} {:>9}",
            "Bucket", "Qty", "MinRoll", "N1 any", "N2 any", "N3 any", "Track"
        );
        println!("{}", "-".repeat(88));

        for bucket in &breakdown.buckets {
            println!(
                "{:<32} {:>6} {:>8} {:>9} {:>9} {:>9} {:>9}",
                bucket_label(&bucket.bucket_name),
                bucket.qty.as_ref().map_or_else(|| "-".to_string(), |q| q.to_string()),
                bucket.min_roll,
                at_least(&bucket.per_notch, 0),
                at_least(&bucket.per_notch, 1),
                at_least(&bucket.per_notch, 2),
                pct_cell(Some(bucket.track_pct))
            );
        }

        if breakdown.buckets.is_empty() {
            println!("(no buckets reachable)");
        }
        return Ok(());
    }

    if let Some(bucket) = row.direct_bucket_id.as_deref() {
        let cells = direct_bucket_notches(&row.merged.per_notch);
        return print_items(session, bucket, levels, &cells, policy, json);
    }

    bail!("Reward '{}' has no loot table or bucket", reward_id)
}

/// Handle the bucket command
pub fn bucket(
    session: &Session,
    reward_id: &str,
    bucket: &str,
    args: &LevelArgs,
    json: bool,
) -> Result<()> {
    let (levels, row) = find_reward(session, args, reward_id)?;
    let policy = row.merged.policy();
    let wanted = bucket_name(bucket);

    if row.direct_bucket_id.as_deref() == Some(wanted) {
        let cells = direct_bucket_notches(&row.merged.per_notch);
        return print_items(session, wanted, levels, &cells, policy, json);
    }

    let table_id = row
        .loot_table_id
        .as_deref()
        .with_context(|| format!("Reward '{}' has no loot table", reward_id))?;
    let resolver = Resolver::with_fallback(&session.data, fallback(args));
    let breakdown = loot_breakdown(&resolver, table_id, levels, &row.merged.per_notch, policy);

    let found = breakdown
        .buckets
        .iter()
        .find(|b| b.bucket_name == wanted)
        .with_context(|| {
            format!(
                "Bucket '{}' is not reachable from '{}' at {}",
                wanted, reward_id, levels
            )
        })?;

    print_items(session, wanted, levels, &found.per_notch, policy, json)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketItems<'a> {
    bucket_name: &'a str,
    eligible: usize,
    items: Vec<ItemRow>,
}

fn print_items(
    session: &Session,
    bucket: &str,
    levels: Levels,
    per_notch: &[Option<BucketNotch>; 3],
    policy: TrackPolicy,
    json: bool,
) -> Result<()> {
    let all = session.data.bucket(bucket).unwrap_or_default();
    let eligible = eligible_items(all, levels.player);
    let items = bucket_items(&eligible, per_notch, policy);

    if json {
        let out = BucketItems {
            bucket_name: bucket,
            eligible: eligible.len(),
            items,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Bucket {}  |  {} of {} items eligible at level {}\n",
        bucket,
        eligible.len(),
        all.len(),
        levels.player
    );
    println!(
        "{:<36} {:<10} {:>9} {:>9} {:>9} {:>9}",
        "Item", "Rarity", "N1 any", "N2 any", "N3 any", "Track"
    );
    println!("{}", "-".repeat(86));

    for item in &items {
        println!(
            "{:<36} {:<10} {:>9} {:>9} {:>9} {:>9}",
            item.display_name,
            item.rarity,
            at_least(&item.per_notch, 0),
            at_least(&item.per_notch, 1),
            at_least(&item.per_notch, 2),
            pct_cell(Some(item.track_pct))
        );
    }
    Ok(())
}

/// Table column label of a breakdown row; `[LTID]` entries show as tables
fn bucket_label(name: &str) -> String {
    let table = table_name(name);
    if table.len() == name.len() {
        name.to_string()
    } else {
        format!("{} (table)", table)
    }
}

fn at_least(per_notch: &[Option<BucketNotch>; 3], slot: usize) -> String {
    pct_cell(per_notch[slot].map(|b| b.at_least_pct))
}

/// Handle the gs command
pub fn gear_score(session: &Session, table_id: &str, args: &LevelArgs) -> Result<()> {
    let levels = session.levels(args);
    if session.data.loot_table(table_id).is_none() {
        tracing::warn!(table = table_id, "unknown loot table");
    }

    let resolver = Resolver::with_fallback(&session.data, fallback(args));
    println!("{}  |  {}", table_id, levels);
    println!("{}", resolver.resolve_gear_score_range(table_id, levels));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_label() {
        assert_eq!(bucket_label("Weapons_T1"), "Weapons_T1");
        assert_eq!(bucket_label("[LTID]LT_Weapons_Max"), "LT_Weapons_Max (table)");
    }
}
