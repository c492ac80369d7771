//! Effective loot table model after tier and sub-table reduction.

use serde::Serialize;
use std::fmt;

use crate::dataset::{ContentEntry, DataSource, Levels};
use crate::tier::{Resolver, VisitChain};

/// How the entries of an effective model are granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Exactly one entry, pinned by the selected tier
    Single,
    /// Every entry is granted
    And,
    /// One entry is picked by a roll in `[0, max_roll]`
    Or,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "SINGLE"),
            Mode::And => write!(f, "AND"),
            Mode::Or => write!(f, "OR"),
        }
    }
}

/// Why a model has the entries it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelOrigin {
    /// Built from a selected tier or the declared contents
    Resolved,
    /// Walk re-entered a table already on the chain
    Loop,
    /// Table definition or contents are unknown
    Missing,
}

/// Normalized view of a loot table for one set of levels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveModel {
    /// Table the entries come from (the last sub-table reached)
    pub table_id: String,
    pub mode: Mode,
    /// Rule text as declared by the contents
    pub rule: String,
    pub condition: String,
    pub max_roll: i64,
    /// Owned copies of the dataset entries
    pub entries: Vec<ContentEntry>,
    pub origin: ModelOrigin,
}

impl EffectiveModel {
    fn empty(table_id: &str, origin: ModelOrigin) -> Self {
        Self {
            table_id: table_id.to_string(),
            mode: Mode::Single,
            rule: match origin {
                ModelOrigin::Loop => "LOOP".to_string(),
                _ => String::new(),
            },
            condition: String::new(),
            max_roll: 0,
            entries: Vec::new(),
            origin,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'d, D: DataSource + ?Sized> Resolver<'d, D> {
    /// Reduce a loot table to the entries that can actually be rolled.
    ///
    /// A qualifying tier either redirects to its sub-table (whose model is
    /// returned as-is) or pins the entry at the tier's position. Without a
    /// qualifying tier the declared rule applies: AND when the rule text
    /// contains "AND", OR otherwise.
    pub fn build_effective_model(
        &self,
        table_id: &str,
        levels: Levels,
        visited: &VisitChain<'_>,
    ) -> EffectiveModel {
        if visited.contains(table_id) {
            tracing::debug!(
                table = table_id,
                depth = visited.depth(),
                "loot table cycle truncated"
            );
            return EffectiveModel::empty(table_id, ModelOrigin::Loop);
        }

        let data = self.data();
        let (def, contents) = match (data.loot_table(table_id), data.loot_contents(table_id)) {
            (Some(def), Some(contents)) => (def, contents),
            _ => {
                tracing::debug!(table = table_id, "unknown loot table");
                return EffectiveModel::empty(table_id, ModelOrigin::Missing);
            }
        };

        let condition = def.condition.clone().unwrap_or_default();

        if let Some(selected) = self.resolve_tier(table_id, levels, visited) {
            if let Some(sub_table) = selected.tier.sub_table.as_deref() {
                let here = visited.enter(table_id);
                return self.build_effective_model(sub_table, levels, &here);
            }

            let rule = if contents.rule.is_empty() {
                Mode::Single.to_string()
            } else {
                contents.rule.clone()
            };

            return EffectiveModel {
                table_id: table_id.to_string(),
                mode: Mode::Single,
                rule,
                condition,
                max_roll: contents.max_roll,
                entries: contents
                    .entries
                    .get(selected.index)
                    .cloned()
                    .into_iter()
                    .collect(),
                origin: ModelOrigin::Resolved,
            };
        }

        let mode = if contents.rule.to_uppercase().contains("AND") {
            Mode::And
        } else {
            Mode::Or
        };

        EffectiveModel {
            table_id: table_id.to_string(),
            mode,
            rule: if contents.rule.is_empty() {
                mode.to_string()
            } else {
                contents.rule.clone()
            },
            condition,
            max_roll: contents.max_roll,
            entries: contents.entries.clone(),
            origin: ModelOrigin::Resolved,
        }
    }
}
