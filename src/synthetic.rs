use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::catalog::Catalog;
use crate::table::Table;

const REGIONS: &[&str] = &["kr", "euw", "vn", "na"];

/// Synthetic stand-ins for the three collector-produced input tables, for
/// tests, benches and quick local runs without any scraped data. Seed the
/// rng for reproducible tables.
pub fn player_table(catalog: &Catalog, rng: &mut StdRng, rows: usize) -> Table {
    let mut headers = vec![
        "player_id".to_string(),
        "region".to_string(),
        "champion".to_string(),
        "total_games".to_string(),
        "win_rate".to_string(),
    ];
    for i in 1..=3 {
        for col in ["most_champ", "WR", "KDA", "W", "L"] {
            headers.push(format!("{col}_{i}"));
        }
    }
    for i in 1..=3 {
        headers.push(format!("7d_champ_{i}"));
        headers.push(format!("7d_W_{i}"));
        headers.push(format!("7d_L_{i}"));
        headers.push(format!("7d_total_{i}"));
        headers.push(format!("7d_WR_{i}"));
    }
    for i in 1..=7 {
        headers.push(format!("season_champ_{i}"));
        headers.push(format!("wr_ssn_{i}"));
        headers.push(format!("games_ssn_{i}"));
        headers.push(format!("kda_ssn_{i}"));
        headers.push(format!("k_ssn_{i}"));
        headers.push(format!("a_ssn_{i}"));
    }
    for i in 1..=16 {
        headers.push(format!("mastery_champ_{i}"));
        headers.push(format!("m_lv_{i}"));
    }
    for i in 1..=4 {
        headers.push(format!("team_champ{i}"));
    }
    for i in 1..=5 {
        headers.push(format!("opp_champ{i}"));
    }

    let mut table = Table::new(headers);
    for idx in 0..rows {
        let mut cells = vec![
            format!("player-{idx}"),
            (*REGIONS.choose(rng).unwrap_or(&"kr")).to_string(),
            pick(catalog, rng),
            rng.gen_range(10..400).to_string(),
            format!("{:.2}", rng.gen_range(0.35..0.65)),
        ];

        for _ in 1..=3 {
            let wins = rng.gen_range(0..12);
            let losses = rng.gen_range(0..12);
            cells.push(pick(catalog, rng));
            cells.push(format!("{:.2}", rng.gen_range(0.2..0.8)));
            cells.push(format!("{:.2}", rng.gen_range(0.5..8.0)));
            cells.push(wins.to_string());
            cells.push(losses.to_string());
        }
        for _ in 1..=3 {
            let wins = rng.gen_range(0..8);
            let losses = rng.gen_range(0..8);
            cells.push(pick(catalog, rng));
            cells.push(wins.to_string());
            cells.push(losses.to_string());
            cells.push((wins + losses).to_string());
            cells.push(format!("{}%", rng.gen_range(20..80)));
        }
        for _ in 1..=7 {
            cells.push(pick(catalog, rng));
            cells.push(format!("{}%", rng.gen_range(30..70)));
            cells.push(rng.gen_range(5..150).to_string());
            cells.push(format!("{:.2}", rng.gen_range(0.5..7.0)));
            cells.push(format!("{:.1}", rng.gen_range(1.0..10.0)));
            cells.push(format!("{:.1}", rng.gen_range(1.0..12.0)));
        }
        for _ in 1..=16 {
            cells.push(pick(catalog, rng));
            cells.push(rng.gen_range(1..8).to_string());
        }
        for _ in 1..=4 {
            cells.push(pick(catalog, rng));
        }
        for _ in 1..=5 {
            cells.push(pick(catalog, rng));
        }

        table.push_row_lossy(cells);
    }
    table
}

/// Tier/counter snapshot: roughly one row per champion, some champions
/// repeated with a second role row and some left untiered.
pub fn meta_table(catalog: &Catalog, rng: &mut StdRng) -> Table {
    let mut table = Table::new(
        ["champion", "tier", "counter1", "counter2", "counter3"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for name in catalog.names() {
        let rows = if rng.gen_bool(0.15) { 2 } else { 1 };
        for _ in 0..rows {
            let tier = if rng.gen_bool(0.9) {
                rng.gen_range(1..=5).to_string()
            } else {
                String::new()
            };
            table.push_row_lossy(vec![
                name.clone(),
                tier,
                pick(catalog, rng),
                pick(catalog, rng),
                if rng.gen_bool(0.5) {
                    pick(catalog, rng)
                } else {
                    String::new()
                },
            ]);
        }
    }
    table
}

pub fn weekly_table(catalog: &Catalog, rng: &mut StdRng) -> Table {
    let mut table = Table::new(
        ["champion", "rank", "games", "pick", "ban"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for (idx, name) in catalog.names().iter().enumerate() {
        // Not every champion makes the weekly aggregate.
        if rng.gen_bool(0.2) {
            continue;
        }
        table.push_row_lossy(vec![
            name.clone(),
            (idx + 1).to_string(),
            rng.gen_range(10..500).to_string(),
            format!("{:.1}%", rng.gen_range(0.5..25.0)),
            format!("{:.1}%", rng.gen_range(0.0..40.0)),
        ]);
    }
    table
}

fn pick(catalog: &Catalog, rng: &mut StdRng) -> String {
    catalog
        .names()
        .choose(rng)
        .cloned()
        .unwrap_or_default()
}
