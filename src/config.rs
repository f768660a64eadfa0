use std::env;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Rows kept when test mode trims the input for fast iteration.
pub const TEST_MODE_ROWS: usize = 100;

/// Fusion weights for the five signals. Weekly and recent dominate: the
/// product goal is to favor current form over lifetime stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub recent: f64,
    pub weekly: f64,
    pub meta: f64,
    pub season: f64,
    pub mastery: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            recent: 0.3,
            weekly: 0.4,
            meta: 0.2,
            season: 0.06,
            mastery: 0.04,
        }
    }
}

impl SignalWeights {
    pub fn validate(&self) -> Result<()> {
        let parts = [self.recent, self.weekly, self.meta, self.season, self.mastery];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(anyhow!("signal weights must be finite and non-negative"));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(anyhow!("signal weights must sum to 1.0, got {sum}"));
        }
        Ok(())
    }
}

/// Multipliers discounting champions the meta snapshot ever judged weak.
/// Tiers 1-2 (and untiered champions) are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierPenalties {
    pub tier3: f64,
    pub tier4: f64,
    pub tier5: f64,
}

impl Default for TierPenalties {
    fn default() -> Self {
        Self {
            tier3: 0.9,
            tier4: 0.85,
            tier5: 0.8,
        }
    }
}

impl TierPenalties {
    pub fn multiplier(&self, tier: Option<u8>) -> f64 {
        match tier {
            Some(3) => self.tier3,
            Some(4) => self.tier4,
            Some(5) => self.tier5,
            _ => 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for m in [self.tier3, self.tier4, self.tier5] {
            if !(0.0..=1.0).contains(&m) {
                return Err(anyhow!("tier penalty multipliers must be within 0..=1"));
            }
        }
        Ok(())
    }
}

/// Tunables for one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub batch_size: usize,
    pub consider_team_comp: bool,
    pub weights: SignalWeights,
    pub tier_penalties: TierPenalties,
    /// Added per opposing champion known to counter the candidate.
    pub counter_penalty_step: f64,
    /// Checkpoint write attempts before the run aborts.
    pub checkpoint_retries: u32,
    pub test_mode: bool,
    /// Emit per-row audit traces for this champion only.
    pub debug_champion: Option<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            consider_team_comp: true,
            weights: SignalWeights::default(),
            tier_penalties: TierPenalties::default(),
            counter_penalty_step: 0.1,
            checkpoint_retries: 3,
            test_mode: false,
            debug_champion: None,
        }
    }
}

impl ScoringConfig {
    /// Defaults overlaid with `DRAFTSCORE_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.batch_size = env::var("DRAFTSCORE_BATCH_SIZE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(cfg.batch_size);
        if let Some(flag) = env_bool("DRAFTSCORE_TEAM_COMP") {
            cfg.consider_team_comp = flag;
        }
        if let Some(flag) = env_bool("DRAFTSCORE_TEST_MODE") {
            cfg.test_mode = flag;
        }
        cfg.checkpoint_retries = env::var("DRAFTSCORE_CHECKPOINT_RETRIES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(cfg.checkpoint_retries);
        cfg.weights.recent = env_f64("DRAFTSCORE_W_RECENT").unwrap_or(cfg.weights.recent);
        cfg.weights.weekly = env_f64("DRAFTSCORE_W_WEEKLY").unwrap_or(cfg.weights.weekly);
        cfg.weights.meta = env_f64("DRAFTSCORE_W_META").unwrap_or(cfg.weights.meta);
        cfg.weights.season = env_f64("DRAFTSCORE_W_SEASON").unwrap_or(cfg.weights.season);
        cfg.weights.mastery = env_f64("DRAFTSCORE_W_MASTERY").unwrap_or(cfg.weights.mastery);
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(anyhow!("batch size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.counter_penalty_step) {
            return Err(anyhow!("counter penalty step must be within 0..=1"));
        }
        self.weights.validate()?;
        self.tier_penalties.validate()?;
        Ok(())
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key).ok()?.trim().parse::<f64>().ok()
}
