//! Dataset validation command

use anyhow::{Context, Result};
use std::path::Path;
use track_odds::{Dataset, NOTCHES};

/// Load the dataset (which validates it) and print what it holds
pub fn handle(path: &Path) -> Result<()> {
    let data = Dataset::load(path)
        .with_context(|| format!("Dataset {} is invalid", path.display()))?;

    println!("Dataset {} is valid\n", path.display());
    println!("  {:>6} loot tables", data.loot_tables.len());
    println!("  {:>6} loot contents", data.loot_contents.len());
    println!("  {:>6} buckets", data.buckets.len());
    println!("  {:>6} rewards", data.rewards.len());
    println!("  {:>6} store slots", data.store.len());
    for notch in NOTCHES {
        let slots = data.store.iter().filter(|s| s.notch == notch).count();
        println!("         notch {}: {}", notch, slots);
    }

    let dangling = dangling_references(&data);
    for reference in &dangling {
        tracing::warn!("{}", reference);
    }
    if !dangling.is_empty() {
        println!("\n{} dangling references (run with -v for details)", dangling.len());
    }

    Ok(())
}

/// References to tables, contents or rewards that the dataset doesn't define
fn dangling_references(data: &Dataset) -> Vec<String> {
    let mut out = Vec::new();

    for (id, def) in &data.loot_tables {
        if !data.loot_contents.contains_key(id) {
            out.push(format!("loot table {} has no contents", id));
        }
        for tier in &def.tiers {
            if let Some(sub) = tier.sub_table.as_deref() {
                if !data.loot_tables.contains_key(sub) {
                    out.push(format!("loot table {} redirects to unknown {}", id, sub));
                }
            }
        }
    }

    for (id, meta) in &data.rewards {
        if let Some(table) = meta.loot_table_id.as_deref() {
            if !table.is_empty() && !data.loot_tables.contains_key(table) {
                out.push(format!("reward {} rolls on unknown table {}", id, table));
            }
        }
    }

    for slot in &data.store {
        if !data.rewards.contains_key(&slot.reward_id) {
            out.push(format!(
                "notch {} offers unknown reward {}",
                slot.notch, slot.reward_id
            ));
        }
    }

    out.sort();
    out
}
