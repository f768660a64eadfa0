use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::ScoringConfig;
use crate::meta::MetaIndex;
use crate::observation::Observation;
use crate::signals::{SignalScores, compute_signals};

/// Why a cell was forced to zero by team context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaskReason {
    /// An ally already committed to the champion.
    OwnTeam,
    /// The opposing side already took the champion.
    OpponentPick,
}

/// Pre-/post-penalty intermediates for one cell, kept only in debug mode.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreTrace {
    pub row: usize,
    pub player: String,
    pub champion: String,
    pub signals: SignalScores,
    pub base: f64,
    pub after_tier: f64,
    pub counter_penalty: f64,
    pub countered_by: Vec<String>,
    pub masked: Option<MaskReason>,
    pub final_score: f64,
}

/// Combines raw signals into a final cell score: weighted fusion, then the
/// worst-tier discount, then team-context masking and counter penalties,
/// then a clamp at zero. Pure over read-only inputs, so rows can be scored
/// from any number of threads.
pub struct PenaltyEngine<'a> {
    catalog: &'a Catalog,
    meta: &'a MetaIndex,
    config: &'a ScoringConfig,
}

impl<'a> PenaltyEngine<'a> {
    pub fn new(catalog: &'a Catalog, meta: &'a MetaIndex, config: &'a ScoringConfig) -> Self {
        Self {
            catalog,
            meta,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn score_cell(&self, obs: &Observation, champ: &str) -> f64 {
        self.evaluate(obs, champ).1
    }

    /// One full score vector in catalog column order.
    pub fn score_row(&self, obs: &Observation) -> Vec<f64> {
        self.catalog
            .names()
            .iter()
            .map(|champ| self.score_cell(obs, champ))
            .collect()
    }

    pub fn trace_cell(&self, obs: &Observation, champ: &str, row: usize) -> ScoreTrace {
        let (mut trace, final_score) = self.evaluate(obs, champ);
        trace.row = row;
        trace.player = obs.label();
        trace.final_score = final_score;
        trace
    }

    fn evaluate(&self, obs: &Observation, champ: &str) -> (ScoreTrace, f64) {
        let weights = &self.config.weights;
        let signals = compute_signals(obs, champ, self.meta);
        let base = signals.recent * weights.recent
            + signals.weekly * weights.weekly
            + signals.meta * weights.meta
            + signals.season * weights.season
            + signals.mastery * weights.mastery;

        let after_tier = base
            * self
                .config
                .tier_penalties
                .multiplier(self.meta.worst_tier(champ));

        let mut trace = ScoreTrace {
            row: 0,
            player: String::new(),
            champion: champ.to_string(),
            signals,
            base,
            after_tier,
            counter_penalty: 0.0,
            countered_by: Vec::new(),
            masked: None,
            final_score: 0.0,
        };

        let mut score = after_tier;
        if self.config.consider_team_comp {
            if obs.teammates.iter().any(|ally| ally == champ) {
                trace.masked = Some(MaskReason::OwnTeam);
                return (trace, 0.0);
            }
            if obs.opponents.iter().any(|opp| opp == champ) {
                trace.masked = Some(MaskReason::OpponentPick);
                return (trace, 0.0);
            }
            let mut penalty = 0.0;
            for opp in &obs.opponents {
                if self.meta.is_countered_by(champ, opp) {
                    penalty += self.config.counter_penalty_step;
                    trace.countered_by.push(opp.clone());
                }
            }
            if penalty > 0.0 {
                trace.counter_penalty = penalty;
                score *= 1.0 - penalty;
            }
        }

        (trace, score.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::RecentSlot;
    use crate::table::Table;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    fn catalog() -> Catalog {
        Catalog::new(["X", "Y", "Z"]).unwrap()
    }

    fn meta_index(meta_csv: &str) -> MetaIndex {
        let meta = Table::from_csv_str(meta_csv).unwrap();
        let weekly = Table::from_csv_str("champion,rank,games,pick,ban\n").unwrap();
        MetaIndex::from_tables(&meta, &weekly)
    }

    fn obs_playing_x() -> Observation {
        Observation {
            total_games: Some(20.0),
            recent: vec![RecentSlot {
                champ: "X".into(),
                win_rate: 0.75,
                kda: 4.0,
                wins: 3.0,
                losses: 1.0,
            }],
            ..Observation::default()
        }
    }

    fn base_for_x(config: &ScoringConfig) -> f64 {
        let quality = 0.75 * 0.7 + 0.4 * 0.3;
        let recent = quality * (0.7 + 0.3 * 0.8) * (1.0 + 0.2 * 0.2);
        recent * config.weights.recent
    }

    #[test]
    fn weighted_fusion_without_penalties() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);
        approx(engine.score_cell(&obs_playing_x(), "X"), base_for_x(&config));
    }

    #[test]
    fn worst_tier_discount_applies() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\nX,5,,,\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);
        approx(
            engine.score_cell(&obs_playing_x(), "X"),
            base_for_x(&config) * 0.8,
        );
    }

    #[test]
    fn own_team_mask_fires_before_tier_matters() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\nX,4,,,\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);

        let mut obs = obs_playing_x();
        obs.teammates.push("X".into());
        obs.opponents.push("X".into());
        let trace = engine.trace_cell(&obs, "X", 0);
        assert_eq!(trace.masked, Some(MaskReason::OwnTeam));
        approx(trace.final_score, 0.0);
    }

    #[test]
    fn opponent_pick_masks_to_zero() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);

        let mut obs = obs_playing_x();
        obs.opponents.push("X".into());
        approx(engine.score_cell(&obs, "X"), 0.0);
    }

    #[test]
    fn counter_penalty_stacks_after_tier() {
        let catalog = catalog();
        // Y counters X, and X is tier 3.
        let meta = meta_index("champion,tier,counter1,counter2,counter3\nX,3,Y,,\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);

        let mut obs = obs_playing_x();
        obs.opponents.push("Y".into());
        approx(
            engine.score_cell(&obs, "X"),
            base_for_x(&config) * 0.9 * (1.0 - 0.1),
        );

        // A second countering opponent stacks another step.
        obs.opponents.push("Y".into());
        approx(
            engine.score_cell(&obs, "X"),
            base_for_x(&config) * 0.9 * (1.0 - 0.2),
        );
    }

    #[test]
    fn team_comp_disabled_skips_masking_and_counters() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\nX,3,Y,,\n");
        let mut config = ScoringConfig::default();
        config.consider_team_comp = false;
        let engine = PenaltyEngine::new(&catalog, &meta, &config);

        let mut obs = obs_playing_x();
        obs.teammates.push("X".into());
        obs.opponents.push("Y".into());
        approx(engine.score_cell(&obs, "X"), base_for_x(&config) * 0.9);
    }

    #[test]
    fn scores_never_go_negative() {
        let catalog = catalog();
        let weekly =
            Table::from_csv_str("champion,rank,games,pick,ban\nX,0,0,0%,95%\n").unwrap();
        let meta = Table::from_csv_str("champion,tier,counter1,counter2,counter3\n").unwrap();
        let index = MetaIndex::from_tables(&meta, &weekly);
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &index, &config);

        // Meta signal is negative (pure ban pressure); the clamp holds.
        let obs = Observation::default();
        assert_eq!(engine.score_cell(&obs, "X"), 0.0);
    }

    #[test]
    fn score_row_is_in_catalog_order() {
        let catalog = catalog();
        let meta = meta_index("champion,tier,counter1,counter2,counter3\n");
        let config = ScoringConfig::default();
        let engine = PenaltyEngine::new(&catalog, &meta, &config);
        let row = engine.score_row(&obs_playing_x());
        assert_eq!(row.len(), 3);
        assert!(row[0] > 0.0);
        approx(row[1], 0.0);
        approx(row[2], 0.0);
    }
}
