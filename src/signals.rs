use serde::Serialize;

use crate::meta::MetaIndex;
use crate::observation::Observation;

/// Profile win rate assumed when the profile column is missing.
const DEFAULT_PROFILE_WIN_RATE: f64 = 0.5;
/// Lifetime game count assumed when the profile column is missing.
const DEFAULT_TOTAL_GAMES: f64 = 20.0;
/// Sample size past which extreme performance gets sharpened.
const SHARPEN_MIN_GAMES: f64 = 5.0;

/// The five raw sub-scores for one (observation, champion) cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SignalScores {
    pub recent: f64,
    pub weekly: f64,
    pub meta: f64,
    pub season: f64,
    pub mastery: f64,
}

pub fn compute_signals(obs: &Observation, champ: &str, meta: &MetaIndex) -> SignalScores {
    SignalScores {
        recent: recent_score(obs, champ),
        weekly: weekly_score(obs, champ),
        meta: meta_score(champ, meta),
        season: season_score(obs, champ),
        mastery: mastery_score(obs, champ),
    }
}

/// Recent-window performance. First matching slot wins (slot 1 is the most
/// played, so it takes priority over later duplicates).
pub fn recent_score(obs: &Observation, champ: &str) -> f64 {
    let Some(slot) = obs.recent.iter().find(|s| s.champ == champ) else {
        return 0.0;
    };
    let games = slot.games();
    let total_games = match obs.total_games {
        Some(total) if total > 0.0 => total,
        _ => DEFAULT_TOTAL_GAMES,
    };

    let quality = slot.win_rate * 0.7 + slot.kda.min(10.0) / 10.0 * 0.3;
    let quality = if games >= SHARPEN_MIN_GAMES {
        sharpen(quality)
    } else {
        quality
    };

    let games_factor = (games / 5.0).min(1.0);
    let games_ratio = games / total_games;
    quality * (0.7 + 0.3 * games_factor) * (1.0 + 0.2 * games_ratio)
}

/// Last-7-days form, blended with the trend against the lifetime win rate.
pub fn weekly_score(obs: &Observation, champ: &str) -> f64 {
    let Some(slot) = obs.weekly.iter().find(|s| s.champ == champ) else {
        return 0.0;
    };
    if slot.games <= 0.0 {
        return 0.0;
    }
    let profile_wr = obs.win_rate.unwrap_or(DEFAULT_PROFILE_WIN_RATE);

    let trend = if profile_wr > 0.0 {
        ((slot.win_rate - profile_wr) / profile_wr).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let intensity = (slot.games / 10.0).min(1.0);
    let win_ratio = slot.wins / slot.games;

    let performance = slot.win_rate * 0.4 + trend * 0.2 + intensity * 0.2 + win_ratio * 0.2;
    let performance = if slot.games >= SHARPEN_MIN_GAMES {
        sharpen(performance)
    } else {
        performance
    };

    performance * (0.7 + 0.3 * (slot.games / 5.0).min(1.0))
}

/// Global popularity from the weekly meta aggregate; not slot-based.
pub fn meta_score(champ: &str, meta: &MetaIndex) -> f64 {
    let Some(entry) = meta.weekly(champ) else {
        return 0.0;
    };
    let rank_term = if entry.rank > 0.0 {
        0.5 / entry.rank
    } else {
        0.0
    };
    rank_term + 0.3 * (entry.games / 100.0) + 0.1 * entry.pick_rate - 0.1 * entry.ban_rate
}

pub fn season_score(obs: &Observation, champ: &str) -> f64 {
    let Some(slot) = obs.season.iter().find(|s| s.champ == champ) else {
        return 0.0;
    };
    (slot.win_rate * 0.7 + slot.kda / 10.0 * 0.3) * (slot.games / 100.0)
}

pub fn mastery_score(obs: &Observation, champ: &str) -> f64 {
    let Some(slot) = obs.mastery.iter().find(|s| s.champ == champ) else {
        return 0.0;
    };
    slot.level / 7.0
}

/// Push extreme results further out once the sample is big enough to trust.
fn sharpen(quality: f64) -> f64 {
    if quality < 0.4 {
        quality * 0.8
    } else if quality > 0.7 {
        quality * 1.2
    } else {
        quality
    }
}
