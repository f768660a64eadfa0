use draftscore::catalog::Catalog;
use draftscore::config::ScoringConfig;
use draftscore::meta::MetaIndex;
use draftscore::observation::Observation;
use draftscore::penalty::PenaltyEngine;
use draftscore::table::Table;

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}

const PLAYER_COLUMNS: &[&str] = &[
    "player_id",
    "region",
    "champion",
    "total_games",
    "win_rate",
    "most_champ_1",
    "WR_1",
    "KDA_1",
    "W_1",
    "L_1",
    "7d_champ_1",
    "7d_W_1",
    "7d_L_1",
    "7d_total_1",
    "7d_WR_1",
    "team_champ1",
    "opp_champ1",
    "opp_champ2",
];

/// Build a one-row player table from (column, value) pairs; every other
/// column stays blank, as it would in a sparse scrape.
fn decode_one(cells: &[(&str, &str)]) -> Observation {
    let mut row = vec![String::new(); PLAYER_COLUMNS.len()];
    for (name, value) in cells {
        let idx = PLAYER_COLUMNS
            .iter()
            .position(|c| c == name)
            .unwrap_or_else(|| panic!("unknown column {name}"));
        row[idx] = (*value).to_string();
    }
    let csv = format!("{}\n{}\n", PLAYER_COLUMNS.join(","), row.join(","));
    let table = Table::from_csv_str(&csv).unwrap();
    Observation::from_row(&table, 0)
}

fn index(meta_csv: &str, weekly_csv: &str) -> MetaIndex {
    let meta = Table::from_csv_str(meta_csv).unwrap();
    let weekly = Table::from_csv_str(weekly_csv).unwrap();
    MetaIndex::from_tables(&meta, &weekly)
}

const EMPTY_META: &str = "champion,tier,counter1,counter2,counter3\n";
const EMPTY_WEEKLY: &str = "champion,rank,games,pick,ban\n";

#[test]
fn recent_form_from_real_columns_scores_as_expected() {
    // Ahri: 75% over 4 recent games, KDA 4.0, no other signal sources.
    let obs = decode_one(&[
        ("player_id", "p1"),
        ("total_games", "20"),
        ("win_rate", "55%"),
        ("most_champ_1", "Ahri"),
        ("WR_1", "75%"),
        ("KDA_1", "4.0"),
        ("W_1", "3"),
        ("L_1", "1"),
    ]);
    let index = index(EMPTY_META, EMPTY_WEEKLY);
    let config = ScoringConfig::default();
    let catalog = Catalog::default_roster();
    let engine = PenaltyEngine::new(catalog, &index, &config);

    // quality = 0.75*0.7 + (4/10)*0.3, confidence ramp at 4/5 games,
    // volume bonus 1 + 0.2*(4/20), then the 0.3 recent weight.
    let quality = 0.75 * 0.7 + 0.4 * 0.3;
    let recent = quality * (0.7 + 0.3 * 0.8) * (1.0 + 0.2 * 0.2);
    approx(engine.score_cell(&obs, "Ahri"), recent * 0.3);

    // A champion the player never touched scores zero without meta data.
    approx(engine.score_cell(&obs, "Zed"), 0.0);
}

#[test]
fn worst_tier_and_counters_flow_through_from_csv() {
    let obs = decode_one(&[
        ("total_games", "20"),
        ("most_champ_1", "Ahri"),
        ("WR_1", "75%"),
        ("KDA_1", "4.0"),
        ("W_1", "3"),
        ("L_1", "1"),
        ("opp_champ1", "Zed"),
    ]);
    // Ahri appears twice: tier 2 in one role, tier 5 in another. The worst
    // row wins. Zed counters Ahri.
    let index = index(
        "champion,tier,counter1,counter2,counter3\nAhri,2,Zed,,\nAhri,5,,,\n",
        EMPTY_WEEKLY,
    );
    let config = ScoringConfig::default();
    let catalog = Catalog::default_roster();
    let engine = PenaltyEngine::new(catalog, &index, &config);

    let quality = 0.75 * 0.7 + 0.4 * 0.3;
    let recent = quality * (0.7 + 0.3 * 0.8) * (1.0 + 0.2 * 0.2);
    approx(
        engine.score_cell(&obs, "Ahri"),
        recent * 0.3 * 0.8 * (1.0 - 0.1),
    );
}

#[test]
fn team_context_masks_from_csv_columns() {
    // Garen is already on the player's team, Zed on the opposing side.
    let obs = decode_one(&[
        ("total_games", "20"),
        ("most_champ_1", "Garen"),
        ("WR_1", "75%"),
        ("KDA_1", "4.0"),
        ("W_1", "3"),
        ("L_1", "1"),
        ("team_champ1", "Garen"),
        ("opp_champ1", "Zed"),
    ]);
    let index = index(EMPTY_META, EMPTY_WEEKLY);
    let config = ScoringConfig::default();
    let catalog = Catalog::default_roster();
    let engine = PenaltyEngine::new(catalog, &index, &config);

    approx(engine.score_cell(&obs, "Garen"), 0.0);
    approx(engine.score_cell(&obs, "Zed"), 0.0);

    let trace = engine.trace_cell(&obs, "Garen", 3);
    assert_eq!(trace.row, 3);
    assert!(trace.base > 0.0);
    approx(trace.final_score, 0.0);
}

#[test]
fn weekly_meta_signal_reaches_untouched_champions() {
    // The player has no history on Jinx, but the meta pushes her.
    let obs = decode_one(&[("player_id", "p1"), ("total_games", "20")]);
    let index = index(
        EMPTY_META,
        "champion,rank,games,pick,ban\nJinx,2,200,15%,5%\n",
    );
    let config = ScoringConfig::default();
    let catalog = Catalog::default_roster();
    let engine = PenaltyEngine::new(catalog, &index, &config);

    let meta_signal = 0.5 / 2.0 + 0.3 * 2.0 + 0.1 * 0.15 - 0.1 * 0.05;
    approx(engine.score_cell(&obs, "Jinx"), meta_signal * 0.2);
}

#[test]
fn debug_trace_carries_all_intermediates() {
    let obs = decode_one(&[
        ("player_id", "p9"),
        ("region", "euw"),
        ("total_games", "20"),
        ("most_champ_1", "Ahri"),
        ("WR_1", "75%"),
        ("KDA_1", "4.0"),
        ("W_1", "3"),
        ("L_1", "1"),
        ("opp_champ1", "Zed"),
    ]);
    let index = index(
        "champion,tier,counter1,counter2,counter3\nAhri,3,Zed,,\n",
        EMPTY_WEEKLY,
    );
    let config = ScoringConfig::default();
    let catalog = Catalog::default_roster();
    let engine = PenaltyEngine::new(catalog, &index, &config);

    let trace = engine.trace_cell(&obs, "Ahri", 42);
    assert_eq!(trace.row, 42);
    assert_eq!(trace.player, "p9 (euw)");
    assert_eq!(trace.champion, "Ahri");
    assert!(trace.signals.recent > 0.0);
    approx(trace.after_tier, trace.base * 0.9);
    approx(trace.counter_penalty, 0.1);
    assert_eq!(trace.countered_by, vec!["Zed".to_string()]);
    approx(trace.final_score, trace.after_tier * 0.9);
}
