use crate::table::{Table, parse_f64, parse_kda, parse_ratio};

/// One recent-window slot (slot 1 = most played in the window).
#[derive(Debug, Clone, PartialEq)]
pub struct RecentSlot {
    pub champ: String,
    pub win_rate: f64,
    pub kda: f64,
    pub wins: f64,
    pub losses: f64,
}

impl RecentSlot {
    pub fn games(&self) -> f64 {
        self.wins + self.losses
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySlot {
    pub champ: String,
    pub wins: f64,
    pub losses: f64,
    pub games: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSlot {
    pub champ: String,
    pub win_rate: f64,
    pub games: f64,
    pub kda: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterySlot {
    pub champ: String,
    pub level: f64,
}

/// One scored row: a player's historical snapshot joined with one match
/// context. Slot vectors keep their positional order; a slot exists only
/// when its champion cell is non-blank, and numeric fields inside a present
/// slot default to 0 when unparseable.
#[derive(Debug, Clone, Default)]
pub struct Observation {
    pub player_id: String,
    pub region: String,
    pub played: Option<String>,
    pub total_games: Option<f64>,
    pub win_rate: Option<f64>,
    pub recent: Vec<RecentSlot>,
    pub weekly: Vec<WeeklySlot>,
    pub season: Vec<SeasonSlot>,
    pub mastery: Vec<MasterySlot>,
    pub teammates: Vec<String>,
    pub opponents: Vec<String>,
}

impl Observation {
    /// Decode one table row by the collection layer's column names. Total:
    /// anything missing or malformed degrades to an absent slot or zero.
    pub fn from_row(table: &Table, row: usize) -> Self {
        let cell = |name: &str| table.cell(row, name);
        let num = |name: &str| cell(name).and_then(parse_f64);
        let ratio = |name: &str| cell(name).and_then(parse_ratio);

        let mut obs = Observation {
            player_id: cell("player_id").unwrap_or_default().to_string(),
            region: cell("region").unwrap_or_default().to_string(),
            played: cell("champion").map(str::to_string),
            total_games: num("total_games"),
            win_rate: ratio("win_rate"),
            ..Observation::default()
        };

        for i in 1..=3 {
            let Some(champ) = cell(&format!("most_champ_{i}")) else {
                continue;
            };
            obs.recent.push(RecentSlot {
                champ: champ.to_string(),
                win_rate: ratio(&format!("WR_{i}")).unwrap_or(0.0),
                kda: cell(&format!("KDA_{i}"))
                    .and_then(|raw| parse_kda(raw, None, None))
                    .unwrap_or(0.0),
                wins: num(&format!("W_{i}")).unwrap_or(0.0),
                losses: num(&format!("L_{i}")).unwrap_or(0.0),
            });
        }

        for i in 1..=3 {
            let Some(champ) = cell(&format!("7d_champ_{i}")) else {
                continue;
            };
            obs.weekly.push(WeeklySlot {
                champ: champ.to_string(),
                wins: num(&format!("7d_W_{i}")).unwrap_or(0.0),
                losses: num(&format!("7d_L_{i}")).unwrap_or(0.0),
                games: num(&format!("7d_total_{i}")).unwrap_or(0.0),
                win_rate: ratio(&format!("7d_WR_{i}")).unwrap_or(0.0),
            });
        }

        for i in 1..=7 {
            let Some(champ) = cell(&format!("season_champ_{i}")) else {
                continue;
            };
            let kills = num(&format!("k_ssn_{i}"));
            let assists = num(&format!("a_ssn_{i}"));
            obs.season.push(SeasonSlot {
                champ: champ.to_string(),
                win_rate: ratio(&format!("wr_ssn_{i}")).unwrap_or(0.0),
                games: num(&format!("games_ssn_{i}")).unwrap_or(0.0),
                kda: cell(&format!("kda_ssn_{i}"))
                    .and_then(|raw| parse_kda(raw, kills, assists))
                    .unwrap_or(0.0),
            });
        }

        for i in 1..=16 {
            let Some(champ) = cell(&format!("mastery_champ_{i}")) else {
                continue;
            };
            obs.mastery.push(MasterySlot {
                champ: champ.to_string(),
                level: num(&format!("m_lv_{i}")).unwrap_or(0.0),
            });
        }

        for i in 1..=4 {
            if let Some(champ) = cell(&format!("team_champ{i}")) {
                obs.teammates.push(champ.to_string());
            }
        }
        for i in 1..=5 {
            if let Some(champ) = cell(&format!("opp_champ{i}")) {
                obs.opponents.push(champ.to_string());
            }
        }

        obs
    }

    pub fn from_table(table: &Table) -> Vec<Self> {
        (0..table.len()).map(|row| Self::from_row(table, row)).collect()
    }

    /// Row identity for log lines.
    pub fn label(&self) -> String {
        match (self.player_id.is_empty(), self.region.is_empty()) {
            (false, false) => format!("{} ({})", self.player_id, self.region),
            (false, true) => self.player_id.clone(),
            _ => "<unidentified>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let raw = "\
player_id,region,champion,total_games,win_rate,\
most_champ_1,WR_1,KDA_1,W_1,L_1,most_champ_2,WR_2,KDA_2,W_2,L_2,\
7d_champ_1,7d_W_1,7d_L_1,7d_total_1,7d_WR_1,\
season_champ_1,wr_ssn_1,games_ssn_1,kda_ssn_1,k_ssn_1,a_ssn_1,\
mastery_champ_1,m_lv_1,team_champ1,opp_champ1,opp_champ2\n\
p1,kr,Ahri,20,55%,\
Ahri,0.75,4.0,3,1,Lux,bad,Perfect,2,,\
Ahri,4,1,5,60%,\
Ahri,52%,120,Perfect,7,9,\
Ahri,7,Garen,Zed,Lux\n";
        Table::from_csv_str(raw).unwrap()
    }

    #[test]
    fn decodes_identity_and_profile() {
        let obs = Observation::from_row(&sample_table(), 0);
        assert_eq!(obs.player_id, "p1");
        assert_eq!(obs.region, "kr");
        assert_eq!(obs.played.as_deref(), Some("Ahri"));
        assert_eq!(obs.total_games, Some(20.0));
        assert_eq!(obs.win_rate, Some(0.55));
    }

    #[test]
    fn malformed_slot_numbers_default_to_zero() {
        let obs = Observation::from_row(&sample_table(), 0);
        assert_eq!(obs.recent.len(), 2);
        let lux = &obs.recent[1];
        assert_eq!(lux.champ, "Lux");
        assert_eq!(lux.win_rate, 0.0);
        // Recent slots carry no kill/assist columns, so Perfect reads as 6.
        assert_eq!(lux.kda, 6.0);
        assert_eq!(lux.losses, 0.0);
    }

    #[test]
    fn season_perfect_kda_uses_kills_plus_assists() {
        let obs = Observation::from_row(&sample_table(), 0);
        assert_eq!(obs.season.len(), 1);
        assert_eq!(obs.season[0].kda, 16.0);
        assert_eq!(obs.season[0].win_rate, 0.52);
    }

    #[test]
    fn team_context_slots_skip_blanks() {
        let obs = Observation::from_row(&sample_table(), 0);
        assert_eq!(obs.teammates, vec!["Garen".to_string()]);
        assert_eq!(obs.opponents, vec!["Zed".to_string(), "Lux".to_string()]);
    }
}
