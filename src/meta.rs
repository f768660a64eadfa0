use std::collections::{HashMap, HashSet};

use crate::table::{Table, parse_f64, parse_ratio};

/// Weekly meta aggregate for one champion (rank, volume, pick/ban rates).
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyMetaEntry {
    pub rank: f64,
    pub games: f64,
    pub pick_rate: f64,
    pub ban_rate: f64,
}

/// Read-only lookups built once per run from the meta snapshot tables.
///
/// A champion may appear in several snapshot rows (one per role); all
/// observed tiers are folded into the worst one (numerically highest), and
/// counter references union across rows.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    worst_tier: HashMap<String, u8>,
    counters: HashMap<String, HashSet<String>>,
    weekly: HashMap<String, WeeklyMetaEntry>,
}

impl MetaIndex {
    pub fn from_tables(meta: &Table, weekly: &Table) -> Self {
        let mut index = MetaIndex::default();

        for row in 0..meta.len() {
            let Some(champ) = meta.cell(row, "champion") else {
                continue;
            };
            // Tierless rows skip tier indexing but still contribute counters.
            if let Some(tier) = meta.cell(row, "tier").and_then(parse_f64) {
                if (1.0..=5.0).contains(&tier) {
                    let tier = tier as u8;
                    index
                        .worst_tier
                        .entry(champ.to_string())
                        .and_modify(|t| *t = (*t).max(tier))
                        .or_insert(tier);
                }
            }
            for col in ["counter1", "counter2", "counter3"] {
                if let Some(counter) = meta.cell(row, col) {
                    index
                        .counters
                        .entry(champ.to_string())
                        .or_default()
                        .insert(counter.to_string());
                }
            }
        }

        for row in 0..weekly.len() {
            let Some(champ) = weekly.cell(row, "champion") else {
                continue;
            };
            if index.weekly.contains_key(champ) {
                // First row per champion wins.
                continue;
            }
            index.weekly.insert(
                champ.to_string(),
                WeeklyMetaEntry {
                    rank: weekly.cell(row, "rank").and_then(parse_f64).unwrap_or(0.0),
                    games: weekly.cell(row, "games").and_then(parse_f64).unwrap_or(0.0),
                    pick_rate: weekly.cell(row, "pick").and_then(parse_ratio).unwrap_or(0.0),
                    ban_rate: weekly.cell(row, "ban").and_then(parse_ratio).unwrap_or(0.0),
                },
            );
        }

        index
    }

    /// Worst (weakest) tier ever observed for the champion, if any row
    /// carried one.
    pub fn worst_tier(&self, champ: &str) -> Option<u8> {
        self.worst_tier.get(champ).copied()
    }

    pub fn counters(&self, champ: &str) -> Option<&HashSet<String>> {
        self.counters.get(champ)
    }

    pub fn is_countered_by(&self, champ: &str, opponent: &str) -> bool {
        self.counters
            .get(champ)
            .is_some_and(|set| set.contains(opponent))
    }

    pub fn weekly(&self, champ: &str) -> Option<&WeeklyMetaEntry> {
        self.weekly.get(champ)
    }
}
