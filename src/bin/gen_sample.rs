use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;

use draftscore::catalog::Catalog;
use draftscore::synthetic;

/// Writes a trio of synthetic input tables (players, meta, weekly) so the
/// scorer can be exercised without any scraped data.
fn main() -> Result<()> {
    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    if raw.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let mut out_dir = PathBuf::from("sample_data");
    let mut rows = 250usize;
    let mut seed = 1u64;

    let mut idx = 0;
    while idx < raw.len() {
        let arg = raw[idx].clone();
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let value = |idx: &mut usize| -> Result<String> {
            if let Some(inline) = &inline {
                return Ok(inline.clone());
            }
            *idx += 1;
            raw.get(*idx)
                .cloned()
                .ok_or_else(|| anyhow!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--out-dir" => out_dir = PathBuf::from(value(&mut idx)?),
            "--rows" => rows = value(&mut idx)?.parse().context("parse --rows")?,
            "--seed" => seed = value(&mut idx)?.parse().context("parse --seed")?,
            other => return Err(anyhow!("unknown argument: {other}\n\n{USAGE}")),
        }
        idx += 1;
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let catalog = Catalog::default_roster();
    let mut rng = StdRng::seed_from_u64(seed);

    let players = synthetic::player_table(catalog, &mut rng, rows);
    let meta = synthetic::meta_table(catalog, &mut rng);
    let weekly = synthetic::weekly_table(catalog, &mut rng);

    let players_path = out_dir.join("players.csv");
    let meta_path = out_dir.join("meta.csv");
    let weekly_path = out_dir.join("weekly.csv");
    players.write_csv(&players_path)?;
    meta.write_csv(&meta_path)?;
    weekly.write_csv(&weekly_path)?;

    println!("Wrote {} player rows to {}", players.len(), players_path.display());
    println!("Wrote {} meta rows to {}", meta.len(), meta_path.display());
    println!("Wrote {} weekly rows to {}", weekly.len(), weekly_path.display());
    Ok(())
}

const USAGE: &str = "gen_sample [--out-dir <dir>] [--rows <n>] [--seed <n>]";
