//! Tier selection and gear score lookup for conditioned loot tables.
//!
//! Loot tables form a string-keyed graph: a tier may redirect to a
//! sub-table, which may redirect again. Every walk carries a [`VisitChain`]
//! of the table ids entered so far; re-entering an id ends the walk.

use crate::dataset::{DataSource, Levels, Tier};

/// Gear score shown when no tier resolves to a concrete range
pub const NO_GEAR_SCORE_RANGE: &str = "—";

/// Table ids entered on the current call chain.
///
/// Each frame lives on the stack of the recursive call that pushed it, so
/// independent resolutions never share visited state.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitChain<'a> {
    id: Option<&'a str>,
    parent: Option<&'a VisitChain<'a>>,
    depth: usize,
}

impl<'a> VisitChain<'a> {
    /// Empty chain for a fresh resolution
    pub fn root() -> Self {
        Self::default()
    }

    /// Chain extended with `id`
    pub fn enter<'b>(&'b self, id: &'b str) -> VisitChain<'b> {
        VisitChain {
            id: Some(id),
            parent: Some(self),
            depth: self.depth + 1,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        let mut frame = Some(self);
        while let Some(f) = frame {
            if f.id == Some(id) {
                return true;
            }
            frame = f.parent;
        }
        false
    }

    /// Number of tables entered
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Which level drives a table's tier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Player level ("Level" conditions)
    Player,
    /// Track level ("PvP_XP" conditions)
    Track,
    /// No tier applies; contents are used as declared
    Ungated,
}

impl Driver {
    pub fn value(self, levels: Levels) -> Option<i64> {
        match self {
            Driver::Player => Some(i64::from(levels.player)),
            Driver::Track => Some(i64::from(levels.track)),
            Driver::Ungated => None,
        }
    }
}

/// How to treat tables whose condition mentions neither level nor track XP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionFallback {
    /// Select tiers by player level
    #[default]
    PlayerLevel,
    /// Select no tier
    Ungated,
}

/// A qualifying tier and its position in the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedTier<'d> {
    pub index: usize,
    pub tier: &'d Tier,
}

/// Walks loot table graphs of a [`DataSource`]
pub struct Resolver<'d, D: DataSource + ?Sized> {
    data: &'d D,
    fallback: ConditionFallback,
}

impl<'d, D: DataSource + ?Sized> Resolver<'d, D> {
    pub fn new(data: &'d D) -> Self {
        Self::with_fallback(data, ConditionFallback::default())
    }

    pub fn with_fallback(data: &'d D, fallback: ConditionFallback) -> Self {
        Self { data, fallback }
    }

    pub fn data(&self) -> &'d D {
        self.data
    }

    /// Driving level for a condition text
    pub fn driver(&self, condition: Option<&str>) -> Driver {
        let cond = condition.unwrap_or_default().to_lowercase();
        if cond.contains("pvp") && cond.contains("xp") {
            Driver::Track
        } else if cond.contains("level") {
            Driver::Player
        } else {
            match self.fallback {
                ConditionFallback::PlayerLevel => Driver::Player,
                ConditionFallback::Ungated => Driver::Ungated,
            }
        }
    }

    /// Tier with the highest `min` not above the driving level.
    ///
    /// Equal floors resolve to the last one scanned. Returns `None` for
    /// unknown tables, tables already on `visited`, or when no tier qualifies.
    pub fn resolve_tier(
        &self,
        table_id: &str,
        levels: Levels,
        visited: &VisitChain<'_>,
    ) -> Option<SelectedTier<'d>> {
        if visited.contains(table_id) {
            tracing::trace!(table = table_id, "tier walk re-entered table");
            return None;
        }

        let def = self.data.loot_table(table_id)?;
        let value = self.driver(def.condition.as_deref()).value(levels)?;

        let mut best: Option<SelectedTier<'d>> = None;
        for (index, tier) in def.tiers.iter().enumerate() {
            if tier.min <= value && best.map_or(true, |b| tier.min >= b.tier.min) {
                best = Some(SelectedTier { index, tier });
            }
        }
        best
    }

    /// First concrete gear score range along the tier/sub-table chain, or
    /// [`NO_GEAR_SCORE_RANGE`]
    pub fn resolve_gear_score_range(&self, table_id: &str, levels: Levels) -> String {
        self.gear_score_in(table_id, levels, &VisitChain::root())
            .map_or_else(|| NO_GEAR_SCORE_RANGE.to_string(), str::to_string)
    }

    fn gear_score_in(
        &self,
        table_id: &str,
        levels: Levels,
        visited: &VisitChain<'_>,
    ) -> Option<&'d str> {
        let selected = self.resolve_tier(table_id, levels, visited)?;
        if let Some(range) = selected.tier.gear_score() {
            return Some(range);
        }

        let sub_table = selected.tier.sub_table.as_deref()?;
        let here = visited.enter(table_id);
        self.gear_score_in(sub_table, levels, &here)
    }
}

/// Numeric bounds of a gear score range ("590-600", "600", or the sentinel)
pub fn parse_gear_score(range: &str) -> (u32, u32) {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut start = None;
    for (i, c) in range.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, range.len()));
    }

    let number = |(s, e): (usize, usize)| range[s..e].parse::<u32>().unwrap_or(0);

    match runs.as_slice() {
        [] => (0, 0),
        [first, second, ..] if range[first.1..second.0].trim() == "-" => {
            (number(*first), number(*second))
        }
        [first, ..] => {
            let n = number(*first);
            (n, n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, LootTableDef};

    fn add_table(data: &mut Dataset, id: &str, condition: Option<&str>, tiers: Vec<Tier>) {
        data.loot_tables.insert(
            id.to_string(),
            LootTableDef {
                condition: condition.map(str::to_string),
                tiers,
            },
        );
    }

    fn test_dataset() -> Dataset {
        let mut data = Dataset::default();
        add_table(
            &mut data,
            "LT_Level",
            Some("Level"),
            vec![
                Tier::range(0, "100-200"),
                Tier::range(20, "300-400"),
                Tier::redirect(50, "LT_Track"),
            ],
        );
        add_table(
            &mut data,
            "LT_Track",
            Some("PvP_XP"),
            vec![Tier::range(0, "500-550"), Tier::range(100, "590-600")],
        );
        add_table(
            &mut data,
            "LT_Self",
            Some("Level"),
            vec![Tier::redirect(0, "LT_Self")],
        );
        add_table(&mut data, "LT_A", Some("Level"), vec![Tier::redirect(0, "LT_B")]);
        add_table(&mut data, "LT_B", Some("Level"), vec![Tier::redirect(0, "LT_A")]);
        add_table(
            &mut data,
            "LT_Weird",
            Some("Faction"),
            vec![Tier::range(0, "1-2")],
        );
        data
    }

    #[test]
    fn test_highest_qualifying_floor_wins() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        let root = VisitChain::root();

        let tier = resolver
            .resolve_tier("LT_Level", Levels::new(25, 0), &root)
            .unwrap();
        assert_eq!(tier.index, 1);
        assert_eq!(tier.tier.gear_score(), Some("300-400"));

        let tier = resolver
            .resolve_tier("LT_Level", Levels::new(20, 0), &root)
            .unwrap();
        assert_eq!(tier.index, 1);

        let tier = resolver
            .resolve_tier("LT_Level", Levels::new(19, 0), &root)
            .unwrap();
        assert_eq!(tier.index, 0);
    }

    #[test]
    fn test_no_qualifying_tier() {
        let mut data = Dataset::default();
        add_table(&mut data, "LT_High", Some("Level"), vec![Tier::range(30, "1-2")]);
        let resolver = Resolver::new(&data);
        assert!(resolver
            .resolve_tier("LT_High", Levels::new(10, 0), &VisitChain::root())
            .is_none());
        assert!(resolver
            .resolve_tier("LT_Missing", Levels::new(10, 0), &VisitChain::root())
            .is_none());
    }

    #[test]
    fn test_condition_drivers() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        assert_eq!(resolver.driver(Some("PvP_XP")), Driver::Track);
        assert_eq!(resolver.driver(Some("pvp track xp")), Driver::Track);
        assert_eq!(resolver.driver(Some("Level")), Driver::Player);
        assert_eq!(resolver.driver(Some("Faction")), Driver::Player);
        assert_eq!(resolver.driver(None), Driver::Player);

        let ungated = Resolver::with_fallback(&data, ConditionFallback::Ungated);
        assert_eq!(ungated.driver(Some("Faction")), Driver::Ungated);
        assert_eq!(ungated.driver(Some("Level")), Driver::Player);
        assert!(ungated
            .resolve_tier("LT_Weird", Levels::new(10, 0), &VisitChain::root())
            .is_none());
        assert!(resolver
            .resolve_tier("LT_Weird", Levels::new(10, 0), &VisitChain::root())
            .is_some());
    }

    #[test]
    fn test_track_condition_uses_track_level() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        let tier = resolver
            .resolve_tier("LT_Track", Levels::new(1, 150), &VisitChain::root())
            .unwrap();
        assert_eq!(tier.index, 1);
        let tier = resolver
            .resolve_tier("LT_Track", Levels::new(70, 99), &VisitChain::root())
            .unwrap();
        assert_eq!(tier.index, 0);
    }

    #[test]
    fn test_equal_floors_last_scanned_wins() {
        let mut data = Dataset::default();
        add_table(
            &mut data,
            "LT_Tie",
            Some("Level"),
            vec![Tier::range(10, "first"), Tier::range(10, "second")],
        );
        let resolver = Resolver::new(&data);
        let tier = resolver
            .resolve_tier("LT_Tie", Levels::new(15, 0), &VisitChain::root())
            .unwrap();
        assert_eq!(tier.index, 1);
    }

    #[test]
    fn test_visited_table_is_skipped() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        let root = VisitChain::root();
        let chain = root.enter("LT_Level");
        assert!(chain.contains("LT_Level"));
        assert!(!root.contains("LT_Level"));
        assert_eq!(chain.depth(), 1);
        assert!(resolver
            .resolve_tier("LT_Level", Levels::new(25, 0), &chain)
            .is_none());
    }

    #[test]
    fn test_gear_score_follows_sub_table() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        assert_eq!(
            resolver.resolve_gear_score_range("LT_Level", Levels::new(10, 0)),
            "100-200"
        );
        // Player 60 redirects to the track-driven table with the same levels
        assert_eq!(
            resolver.resolve_gear_score_range("LT_Level", Levels::new(60, 120)),
            "590-600"
        );
        assert_eq!(
            resolver.resolve_gear_score_range("LT_Level", Levels::new(60, 5)),
            "500-550"
        );
    }

    #[test]
    fn test_gear_score_cycles_yield_sentinel() {
        let data = test_dataset();
        let resolver = Resolver::new(&data);
        assert_eq!(
            resolver.resolve_gear_score_range("LT_Self", Levels::new(10, 0)),
            NO_GEAR_SCORE_RANGE
        );
        assert_eq!(
            resolver.resolve_gear_score_range("LT_A", Levels::new(10, 0)),
            NO_GEAR_SCORE_RANGE
        );
        assert_eq!(
            resolver.resolve_gear_score_range("LT_Missing", Levels::new(10, 0)),
            NO_GEAR_SCORE_RANGE
        );
    }

    #[test]
    fn test_parse_gear_score() {
        assert_eq!(parse_gear_score("590-600"), (590, 600));
        assert_eq!(parse_gear_score("590 - 600"), (590, 600));
        assert_eq!(parse_gear_score("600"), (600, 600));
        assert_eq!(parse_gear_score("GS 625"), (625, 625));
        assert_eq!(parse_gear_score(NO_GEAR_SCORE_RANGE), (0, 0));
        assert_eq!(parse_gear_score("---"), (0, 0));
        assert_eq!(parse_gear_score(""), (0, 0));
    }
}
