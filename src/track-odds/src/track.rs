//! Track-wide aggregation of per-notch chances.

use serde::Serialize;

/// How a reward's notch chances combine over the whole track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackPolicy {
    /// Granted at most once; later notches only count if earlier ones missed
    OnceOnly,
    /// Every notch is an independent chance
    Independent,
}

impl TrackPolicy {
    pub fn from_once_only(once_only: bool) -> Self {
        if once_only {
            TrackPolicy::OnceOnly
        } else {
            TrackPolicy::Independent
        }
    }
}

/// Chance (0-100) of getting a reward at least once across three notches.
///
/// Inputs are each notch's at-least-one-of-three percentage, 0 when the
/// reward is not offered there.
pub fn aggregate_across_notches(p1: f64, p2: f64, p3: f64, policy: TrackPolicy) -> f64 {
    let (p1, p2, p3) = (p1 / 100.0, p2 / 100.0, p3 / 100.0);

    let total = match policy {
        TrackPolicy::OnceOnly => p1 + (1.0 - p1) * p2 + (1.0 - p1) * (1.0 - p2) * p3,
        TrackPolicy::Independent => 1.0 - (1.0 - p1) * (1.0 - p2) * (1.0 - p3),
    };
    total * 100.0
}

/// [`aggregate_across_notches`] over optional per-notch percentages
pub fn aggregate_optional(pcts: [Option<f64>; 3], policy: TrackPolicy) -> f64 {
    let [p1, p2, p3] = pcts.map(|p| p.unwrap_or(0.0));
    aggregate_across_notches(p1, p2, p3, policy)
}
