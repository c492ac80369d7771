//! Track dataset: loot tables, loot contents, buckets, reward metadata and
//! the per-notch store pool.
//!
//! The dataset is loaded once per session and never mutated afterwards.
//! Every lookup the engine needs goes through [`DataSource`], so callers can
//! supply their own storage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::{Error, Result};

/// Highest player level accepted by [`Levels::clamped`]
pub const MAX_PLAYER_LEVEL: u32 = 70;

/// Highest track level accepted by [`Levels::clamped`]
pub const MAX_TRACK_LEVEL: u32 = 200;

/// The three draw slots offered at every track level
pub const NOTCHES: [u8; 3] = [1, 2, 3];

/// Read-only lookups consumed by the engine
pub trait DataSource {
    /// Tier definition of a loot table
    fn loot_table(&self, id: &str) -> Option<&LootTableDef>;

    /// Roll contents (rule, max roll, entries) of a loot table
    fn loot_contents(&self, id: &str) -> Option<&LootContents>;

    /// Items of a loot bucket
    fn bucket(&self, name: &str) -> Option<&[BucketItem]>;

    /// Metadata of a track reward
    fn reward(&self, id: &str) -> Option<&RewardMeta>;

    /// Raw weighted rows offered at one notch of one track level
    fn notch_rows(&self, track_level: u32, notch: u8) -> Vec<NotchRewardRow>;
}

/// Player level and track level driving tier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Levels {
    pub player: u32,
    pub track: u32,
}

impl Levels {
    pub fn new(player: u32, track: u32) -> Self {
        Self { player, track }
    }

    /// Clamp player level to `1..=70` and track level to `0..=200`
    pub fn clamped(player: u32, track: u32) -> Self {
        Self {
            player: player.clamp(1, MAX_PLAYER_LEVEL),
            track: track.min(MAX_TRACK_LEVEL),
        }
    }
}

impl fmt::Display for Levels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lvl {} / Track {}", self.player, self.track)
    }
}

/// One tier of a conditioned loot table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Floor of the driving level for this tier
    #[serde(default, deserialize_with = "lenient::int")]
    pub min: i64,
    /// Gear score range text (e.g. "590-600")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gs_range: Option<String>,
    /// Nested loot table this tier redirects to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_table: Option<String>,
}

impl Tier {
    /// Tier carrying a concrete gear score range
    pub fn range(min: i64, gs_range: &str) -> Self {
        Self {
            min,
            gs_range: Some(gs_range.to_string()),
            sub_table: None,
        }
    }

    /// Tier redirecting to another loot table
    pub fn redirect(min: i64, sub_table: &str) -> Self {
        Self {
            min,
            gs_range: None,
            sub_table: Some(sub_table.to_string()),
        }
    }

    /// Gear score range, ignoring empty and "None" placeholders
    pub fn gear_score(&self) -> Option<&str> {
        self.gs_range
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "None")
    }
}

/// Tier definition of a loot table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootTableDef {
    /// Condition driving tier selection (e.g. "Level", "PvP_XP")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

/// Quantity field as found in loot data (number or free text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Count(i64),
    Decimal(f64),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Count(n) => write!(f, "{}", n),
            Quantity::Decimal(n) => write!(f, "{}", n),
            Quantity::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of a loot table's contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    /// Encoded reference, e.g. "[LBID]Gems_T3", "[LTID]Sub" or a literal item
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Quantity>,
    /// Lower bound of the roll interval reserved for this entry
    #[serde(default, deserialize_with = "lenient::int")]
    pub min_roll: i64,
}

impl ContentEntry {
    pub fn new(raw: &str, min_roll: i64) -> Self {
        Self {
            raw: raw.to_string(),
            qty: None,
            min_roll,
        }
    }
}

/// Roll contents of a loot table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootContents {
    /// "SINGLE", "AND", "OR" or a tier-indexed rule
    #[serde(default)]
    pub rule: String,
    /// Inclusive upper bound of the roll space
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_roll: i64,
    #[serde(default)]
    pub entries: Vec<ContentEntry>,
}

/// A final item inside a loot bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketItem {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub rarity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Quantity>,
    /// Level range and other tags ("Level:0-19")
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
}

impl BucketItem {
    /// Display name, falling back to the item id
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.item_id)
    }
}

/// Metadata of a track reward
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Ownership removes this reward from future pools (artifacts, cosmetics)
    #[serde(default)]
    pub unique_eligible: bool,
    /// Reward resolves through `loot_table_id` instead of being the final item
    #[serde(default)]
    pub roll_on_present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loot_table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_bucket_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub buy_cost: Option<i64>,
    #[serde(default)]
    pub buy_currency: String,
    #[serde(default)]
    pub rarity: String,
    /// Unprocessed item field, used as a display fallback
    #[serde(default)]
    pub raw_item: String,
}

/// One weighted reward offered at a notch (raw input of a notch)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotchRewardRow {
    pub reward_id: String,
    pub weight: u64,
    #[serde(default)]
    pub select_once_only: bool,
}

impl NotchRewardRow {
    pub fn new(reward_id: &str, weight: u64) -> Self {
        Self {
            reward_id: reward_id.to_string(),
            weight,
            select_once_only: false,
        }
    }

    pub fn once_only(reward_id: &str, weight: u64) -> Self {
        Self {
            select_once_only: true,
            ..Self::new(reward_id, weight)
        }
    }
}

/// Store pool slot: a reward offered at one notch on a level schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSlot {
    pub notch: u8,
    /// Level schedule ("odds", "evens", "5ths", "10ths", "post 200" or empty)
    #[serde(default)]
    pub schedule: String,
    pub reward_id: String,
    #[serde(default)]
    pub weight: u64,
    #[serde(default)]
    pub select_once_only: bool,
}

/// Whether a store schedule applies to a track level
pub fn schedule_applies(schedule: &str, level: u32) -> bool {
    match schedule.trim().to_lowercase().as_str() {
        "" => true,
        "odds" => level % 2 == 1,
        "evens" => level % 2 == 0,
        "5ths" => level % 5 == 0,
        "10ths" => level % 10 == 0,
        "post 200" | "post200" | "post_200" | "post200+" | "post200plus" => level > 200,
        _ => true,
    }
}

/// Complete track dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub loot_tables: HashMap<String, LootTableDef>,
    #[serde(default)]
    pub loot_contents: HashMap<String, LootContents>,
    #[serde(default)]
    pub buckets: HashMap<String, Vec<BucketItem>>,
    #[serde(default)]
    pub rewards: HashMap<String, RewardMeta>,
    #[serde(default)]
    pub store: Vec<StoreSlot>,
}

impl Dataset {
    /// Load and validate a dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let data = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            tables = data.loot_tables.len(),
            rewards = data.rewards.len(),
            slots = data.store.len(),
            "loaded dataset"
        );
        Ok(data)
    }

    /// Parse and validate a dataset from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Dataset = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Check tier ordering and store notches.
    ///
    /// Tiers must be sorted ascending by `min` with no repeated floor, so that
    /// tier selection never depends on iteration order.
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<&String> = self.loot_tables.keys().collect();
        ids.sort();

        for id in ids {
            let tiers = &self.loot_tables[id].tiers;
            for pair in tiers.windows(2) {
                if pair[1].min == pair[0].min {
                    return Err(Error::DuplicateTierFloor {
                        table: id.clone(),
                        min: pair[1].min,
                    });
                }
                if pair[1].min < pair[0].min {
                    return Err(Error::UnsortedTiers { table: id.clone() });
                }
            }
        }

        if let Some(slot) = self.store.iter().find(|s| !NOTCHES.contains(&s.notch)) {
            return Err(Error::InvalidNotch(slot.notch));
        }

        Ok(())
    }
}

impl DataSource for Dataset {
    fn loot_table(&self, id: &str) -> Option<&LootTableDef> {
        self.loot_tables.get(id)
    }

    fn loot_contents(&self, id: &str) -> Option<&LootContents> {
        self.loot_contents.get(id)
    }

    fn bucket(&self, name: &str) -> Option<&[BucketItem]> {
        self.buckets.get(name).map(Vec::as_slice)
    }

    fn reward(&self, id: &str) -> Option<&RewardMeta> {
        self.rewards.get(id)
    }

    fn notch_rows(&self, track_level: u32, notch: u8) -> Vec<NotchRewardRow> {
        self.store
            .iter()
            .filter(|s| s.notch == notch && schedule_applies(&s.schedule, track_level))
            .map(|s| NotchRewardRow {
                reward_id: s.reward_id.clone(),
                weight: s.weight,
                select_once_only: s.select_once_only,
            })
            .collect()
    }
}

/// Tolerant readers for hand-exported game data
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Integer from a number, a numeric string or null; anything else is 0
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(to_int).unwrap_or(0))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(to_int))
    }

    /// A single string or a list of strings
    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::String(s)) if !s.is_empty() => vec![s],
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    fn to_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "lootTables": {
            "LT_Weapons": {
                "condition": "Level",
                "tiers": [
                    { "min": 0, "gsRange": "500-520" },
                    { "min": 30, "subTable": "LT_Weapons_High" }
                ]
            }
        },
        "lootContents": {
            "LT_Weapons": {
                "rule": "OR",
                "maxRoll": "99",
                "entries": [
                    { "raw": "[LBID]Swords", "qty": 1, "minRoll": 0 },
                    { "raw": "[LBID]Bows", "qty": "1-2", "minRoll": "50.0" },
                    { "raw": "[LBID]Junk", "minRoll": "n/a" }
                ]
            }
        },
        "buckets": {
            "Swords": [
                { "itemId": "sword_t1", "displayName": "Iron Sword", "rarity": "common", "tags": "Level:0-19" },
                { "itemId": "sword_t2", "tags": ["Level:20-70", "Melee"] }
            ]
        },
        "rewards": {
            "ITM_Weapons": { "name": "Weapon Cache", "rollOnPresent": true, "lootTableId": "LT_Weapons", "buyCost": "250" },
            "ITM_Artifacts_Ring": { "name": "Ring", "uniqueEligible": true }
        },
        "store": [
            { "notch": 1, "rewardId": "ITM_Weapons", "weight": 10 },
            { "notch": 1, "schedule": "odds", "rewardId": "ITM_Artifacts_Ring", "weight": 2, "selectOnceOnly": true },
            { "notch": 2, "schedule": "10ths", "rewardId": "ITM_Weapons", "weight": 5 }
        ]
    }"#;

    #[test]
    fn test_from_json_lenient_fields() {
        let data = Dataset::from_json(SAMPLE).unwrap();

        let contents = data.loot_contents("LT_Weapons").unwrap();
        assert_eq!(contents.max_roll, 99);
        assert_eq!(contents.entries[0].min_roll, 0);
        assert_eq!(contents.entries[1].min_roll, 50);
        assert_eq!(contents.entries[2].min_roll, 0);
        assert_eq!(contents.entries[0].qty, Some(Quantity::Count(1)));
        assert_eq!(
            contents.entries[1].qty,
            Some(Quantity::Text("1-2".to_string()))
        );

        let bucket = data.bucket("Swords").unwrap();
        assert_eq!(bucket[0].tags, vec!["Level:0-19".to_string()]);
        assert_eq!(bucket[1].tags.len(), 2);
        assert_eq!(bucket[0].name(), "Iron Sword");
        assert_eq!(bucket[1].name(), "sword_t2");

        let weapons = data.reward("ITM_Weapons").unwrap();
        assert_eq!(weapons.buy_cost, Some(250));
        assert!(weapons.roll_on_present);
        assert!(!weapons.unique_eligible);
    }

    #[test]
    fn test_tier_gear_score_placeholders() {
        assert_eq!(Tier::range(0, "500-520").gear_score(), Some("500-520"));
        assert_eq!(Tier::range(0, "None").gear_score(), None);
        assert_eq!(Tier::range(0, "  ").gear_score(), None);
        assert_eq!(Tier::redirect(0, "LT_Sub").gear_score(), None);
    }

    #[test]
    fn test_notch_rows_follow_schedule() {
        let data = Dataset::from_json(SAMPLE).unwrap();

        let odd = data.notch_rows(7, 1);
        assert_eq!(odd.len(), 2);
        assert!(odd[1].select_once_only);

        let even = data.notch_rows(8, 1);
        assert_eq!(even.len(), 1);
        assert_eq!(even[0].reward_id, "ITM_Weapons");

        assert_eq!(data.notch_rows(20, 2).len(), 1);
        assert!(data.notch_rows(21, 2).is_empty());
        assert!(data.notch_rows(20, 3).is_empty());
    }

    #[test]
    fn test_schedule_applies() {
        assert!(schedule_applies("", 4));
        assert!(schedule_applies("Odds", 3));
        assert!(!schedule_applies("odds", 4));
        assert!(schedule_applies("evens", 0));
        assert!(schedule_applies("5ths", 15));
        assert!(!schedule_applies("5ths", 16));
        assert!(schedule_applies("10ths", 200));
        assert!(!schedule_applies("post 200", 200));
        assert!(schedule_applies("post200+", 201));
        assert!(schedule_applies("whatever", 1));
    }

    #[test]
    fn test_validate_duplicate_tier_floor() {
        let mut data = Dataset::default();
        data.loot_tables.insert(
            "LT_Dup".to_string(),
            LootTableDef {
                condition: Some("Level".to_string()),
                tiers: vec![Tier::range(0, "1-2"), Tier::range(0, "3-4")],
            },
        );

        match data.validate() {
            Err(Error::DuplicateTierFloor { table, min }) => {
                assert_eq!(table, "LT_Dup");
                assert_eq!(min, 0);
            }
            other => panic!("expected duplicate tier error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_unsorted_tiers() {
        let mut data = Dataset::default();
        data.loot_tables.insert(
            "LT_Desc".to_string(),
            LootTableDef {
                condition: None,
                tiers: vec![Tier::range(10, "1-2"), Tier::range(5, "3-4")],
            },
        );
        assert!(matches!(
            data.validate(),
            Err(Error::UnsortedTiers { table }) if table == "LT_Desc"
        ));
    }

    #[test]
    fn test_validate_invalid_notch() {
        let json = r#"{ "store": [ { "notch": 4, "rewardId": "X", "weight": 1 } ] }"#;
        assert!(matches!(
            Dataset::from_json(json),
            Err(Error::InvalidNotch(4))
        ));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, SAMPLE)?;

        let data = Dataset::load(&path)?;
        assert_eq!(data.rewards.len(), 2);
        assert!(Dataset::load(dir.path().join("missing.json")).is_err());
        Ok(())
    }

    #[test]
    fn test_levels_clamped() {
        assert_eq!(Levels::clamped(0, 0), Levels::new(1, 0));
        assert_eq!(Levels::clamped(99, 500), Levels::new(70, 200));
        assert_eq!(Levels::clamped(42, 17), Levels::new(42, 17));
        assert_eq!(Levels::new(60, 12).to_string(), "Lvl 60 / Track 12");
    }
}
