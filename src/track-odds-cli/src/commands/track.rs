//! Track table command handler

use anyhow::Result;
use std::cmp::Ordering;
use track_odds::{NotchStats, RewardRow, TrackReport};

use super::{fallback, pct_cell, Session};
use crate::cli::{LevelArgs, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn from_asc(asc: bool) -> Self {
        if asc {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }
}

/// What the track table shows and in which order
#[derive(Debug, Clone, Copy)]
pub struct TableView {
    pub sort: SortKey,
    pub dir: SortDir,
    pub limit: Option<usize>,
    pub json: bool,
}

/// Handle the track command
pub fn handle(session: &Session, args: &LevelArgs, view: TableView) -> Result<()> {
    let levels = session.levels(args);
    let mut report = TrackReport::build(&session.data, &session.owned, levels, fallback(args));

    sort_rows(&mut report.rows, view.sort, view.dir);
    if let Some(limit) = view.limit {
        report.rows.truncate(limit);
    }

    if view.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, session.owned.len());
    Ok(())
}

#[derive(Clone, Copy)]
enum NotchColumn {
    Weight,
    Single,
    Any,
}

fn notch_column(key: SortKey) -> Option<(usize, NotchColumn)> {
    use NotchColumn::*;
    Some(match key {
        SortKey::N1Weight => (0, Weight),
        SortKey::N1Single => (0, Single),
        SortKey::N1Any => (0, Any),
        SortKey::N2Weight => (1, Weight),
        SortKey::N2Single => (1, Single),
        SortKey::N2Any => (1, Any),
        SortKey::N3Weight => (2, Weight),
        SortKey::N3Single => (2, Single),
        SortKey::N3Any => (2, Any),
        _ => return None,
    })
}

/// Numeric sort value; absent notches and costs read as 0
fn sort_value(row: &RewardRow, key: SortKey) -> f64 {
    if let Some((slot, column)) = notch_column(key) {
        let stats: Option<&NotchStats> = row.merged.per_notch[slot].as_ref();
        return stats.map_or(0.0, |s| match column {
            NotchColumn::Weight => s.weight as f64,
            NotchColumn::Single => s.percent_single,
            NotchColumn::Any => s.percent_at_least_one_of_three,
        });
    }

    match key {
        SortKey::Cost => row.cost.unwrap_or(0) as f64,
        SortKey::Gs => f64::from(row.gs_min),
        _ => row.merged.track_pct,
    }
}

fn compare(a: &RewardRow, b: &RewardRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a
            .display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase()),
        _ => sort_value(a, key).total_cmp(&sort_value(b, key)),
    }
}

/// Stable sort of report rows by one column
pub fn sort_rows(rows: &mut [RewardRow], key: SortKey, dir: SortDir) {
    rows.sort_by(|a, b| match dir {
        SortDir::Asc => compare(a, b, key),
        SortDir::Desc => compare(b, a, key),
    });
}

fn print_report(report: &TrackReport, owned: usize) {
    println!(
        "{}  |  {} rewards  |  {} owned",
        report.levels,
        report.unique_reward_count(),
        owned
    );
    println!(
        "Notch weights: {} / {} / {}\n",
        report.notches[0].total_weight, report.notches[1].total_weight, report.notches[2].total_weight
    );

    println!(
        "{:<36} {:<11} {:>7} {:>9} {:>9} {:>9} {:>9}",
        "Reward", "GS", "Cost", "N1 any", "N2 any", "N3 any", "Track"
    );
    println!("{}", "-".repeat(96));

    for row in &report.rows {
        let any = |slot: usize| {
            pct_cell(
                row.merged.per_notch[slot]
                    .as_ref()
                    .map(|s| s.percent_at_least_one_of_three),
            )
        };
        let marker = if row.merged.select_once_only { "*" } else { "" };

        println!(
            "{:<36} {:<11} {:>7} {:>9} {:>9} {:>9} {:>9}",
            format!("{}{}", row.display_name, marker),
            row.gear_score,
            row.cost.map_or_else(|| "-".to_string(), |c| c.to_string()),
            any(0),
            any(1),
            any(2),
            pct_cell(Some(row.merged.track_pct))
        );
    }

    if report.rows.iter().any(|r| r.merged.select_once_only) {
        println!("\n* granted at most once per track");
    }
}
