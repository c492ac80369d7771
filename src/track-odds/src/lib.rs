//! # track-odds
//!
//! Probability engine for leveled reward tracks.
//!
//! A track level offers three notches. Each notch draws one reward from a
//! weighted pool; some rewards roll again on a loot table, which picks a
//! tier by player level or track experience and finally lands on item
//! buckets. This crate turns that graph into percentages:
//!
//! - [`Resolver`] walks loot tables (tiers, sub-tables, OR/AND contents)
//! - [`split_probabilities`] converts roll thresholds into bucket shares
//! - [`NotchDistribution`] normalizes one notch's weights
//! - [`merge_rows`] and [`aggregate_across_notches`] combine the notches
//! - [`TrackReport`] ties everything together for one player/track level
//!
//! ## Example
//!
//! ```no_run
//! use track_odds::{ConditionFallback, Dataset, Levels, OwnedSet, TrackReport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = Dataset::load("share/dataset.json")?;
//! let owned = OwnedSet::load_or_default("owned.json")?;
//!
//! let report = TrackReport::build(&data, &owned, Levels::clamped(60, 42), ConditionFallback::default());
//! for row in &report.rows {
//!     println!("{:<40} {:>7.2} %", row.display_name, row.merged.track_pct);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bucket;
pub mod dataset;
pub mod effective;
pub mod merge;
pub mod notch;
pub mod owned;
pub mod report;
pub mod split;
pub mod tier;
pub mod track;

#[doc(inline)]
pub use bucket::{
    bucket_items, bucket_name, direct_bucket_notches, eligible_items, loot_breakdown,
    table_name, tags_match_level, BucketNotch, BucketRow, ItemRow, LootBreakdown,
};
#[doc(inline)]
pub use dataset::{
    BucketItem, ContentEntry, DataSource, Dataset, Levels, LootContents, LootTableDef,
    NotchRewardRow, Quantity, RewardMeta, StoreSlot, Tier, MAX_PLAYER_LEVEL, MAX_TRACK_LEVEL,
    NOTCHES,
};
#[doc(inline)]
pub use effective::{EffectiveModel, Mode, ModelOrigin};
#[doc(inline)]
pub use merge::{merge_rows, MergedRow};
#[doc(inline)]
pub use notch::{NotchDistribution, NotchEntry, NotchStats};
#[doc(inline)]
pub use owned::{OwnedLookup, OwnedSet};
#[doc(inline)]
pub use report::{RewardRow, TrackReport};
#[doc(inline)]
pub use split::{split_probabilities, BucketShare};
#[doc(inline)]
pub use tier::{
    parse_gear_score, ConditionFallback, Driver, Resolver, SelectedTier, VisitChain,
    NO_GEAR_SCORE_RANGE,
};
#[doc(inline)]
pub use track::{aggregate_across_notches, aggregate_optional, TrackPolicy};

/// Errors from loading, validating or persisting track data.
///
/// Probability resolution itself never fails: unknown ids, cycles and zero
/// denominators resolve to empty models or zero percentages.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Loot table '{table}' has more than one tier with min {min}")]
    DuplicateTierFloor { table: String, min: i64 },

    #[error("Loot table '{table}' tiers are not sorted ascending by min")]
    UnsortedTiers { table: String },

    #[error("Invalid notch {0}: expected 1, 2 or 3")]
    InvalidNotch(u8),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Absolute tolerance used when comparing percentages.
pub const PCT_EPSILON: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DuplicateTierFloor {
            table: "LT_Gear".to_string(),
            min: 20,
        };
        assert!(err.to_string().contains("LT_Gear"));
        assert!(err.to_string().contains("min 20"));

        let err = Error::UnsortedTiers {
            table: "LT_Gear".to_string(),
        };
        assert!(err.to_string().contains("not sorted"));

        let err = Error::InvalidNotch(4);
        assert!(err.to_string().contains("Invalid notch 4"));
    }
}
