//! Roll-threshold to probability conversion for effective models.

use serde::Serialize;

use crate::dataset::ContentEntry;
use crate::effective::{EffectiveModel, Mode};

/// Probability mass of one model entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShare {
    pub entry: ContentEntry,
    /// Chance of this entry given the parent reward resolved (0-100)
    pub bucket_pct: f64,
    /// `bucket_pct` scaled by the parent's single-draw chance
    pub mono_global_pct: f64,
    /// `bucket_pct` scaled by the parent's at-least-once chance
    pub at_least_global_pct: f64,
}

/// Split a model into per-entry shares and compose them with the parent's
/// percentages.
///
/// SINGLE and AND models, and any model with at most one entry, grant every
/// entry outright. OR models reserve `[min_roll, next_higher_min_roll - 1]`
/// of the roll space `[0, max_roll]` for each entry. Negative thresholds
/// are read as 0 and overlapping thresholds collapse to empty intervals.
pub fn split_probabilities(
    model: &EffectiveModel,
    parent_single_pct: f64,
    parent_at_least_once_pct: f64,
) -> Vec<BucketShare> {
    let fractions = if matches!(model.mode, Mode::Single | Mode::And) || model.entries.len() <= 1 {
        vec![1.0; model.entries.len()]
    } else {
        roll_fractions(&model.entries, model.max_roll)
    };

    model
        .entries
        .iter()
        .zip(fractions)
        .map(|(entry, fraction)| BucketShare {
            entry: entry.clone(),
            bucket_pct: fraction * 100.0,
            mono_global_pct: fraction * parent_single_pct,
            at_least_global_pct: fraction * parent_at_least_once_pct,
        })
        .collect()
}

/// Fraction of `[0, max_roll]` owned by each entry, in entry order.
///
/// Interval bounds are computed in `i128` so a `max_roll` of `i64::MAX`
/// still yields fractions in `[0, 1]`.
fn roll_fractions(entries: &[ContentEntry], max_roll: i64) -> Vec<f64> {
    let max_roll = i128::from(max_roll.max(0));
    let denom = max_roll + 1;
    if max_roll == 0 {
        tracing::trace!("degenerate max roll, every share is 0");
    }

    let mut order: Vec<(usize, i128)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, i128::from(e.min_roll.max(0))))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1));

    let mut fractions = vec![0.0; entries.len()];
    let mut ceiling = max_roll + 1;
    for (index, threshold) in order {
        let hi = (ceiling - 1).min(max_roll);
        let width = (hi - threshold + 1).max(0);
        fractions[index] = if max_roll > 0 {
            (width as f64 / denom as f64).min(1.0)
        } else {
            0.0
        };
        ceiling = threshold;
    }
    fractions
}
