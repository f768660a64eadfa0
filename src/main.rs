use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use draftscore::catalog::Catalog;
use draftscore::checkpoint::{CheckpointStore, JsonCheckpointStore, SqliteCheckpointStore};
use draftscore::config::ScoringConfig;
use draftscore::meta::MetaIndex;
use draftscore::observation::Observation;
use draftscore::output;
use draftscore::scheduler;
use draftscore::table::Table;

struct CliArgs {
    players: PathBuf,
    meta: PathBuf,
    weekly: PathBuf,
    out: PathBuf,
    checkpoint: Option<PathBuf>,
    checkpoint_db: Option<PathBuf>,
    batch_size: Option<usize>,
    no_team_comp: bool,
    test_mode: bool,
    debug: Option<String>,
    top_k: usize,
    xlsx: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!();
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    let mut config = ScoringConfig::from_env();
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if args.no_team_comp {
        config.consider_team_comp = false;
    }
    if args.test_mode {
        config.test_mode = true;
    }
    config.debug_champion = args.debug.clone();
    config.validate()?;

    let players = Table::read_csv(&args.players).context("load player stats table")?;
    let meta = Table::read_csv(&args.meta).context("load meta stats table")?;
    let weekly = Table::read_csv(&args.weekly).context("load weekly meta table")?;

    let catalog = Catalog::default_roster();
    let meta_index = MetaIndex::from_tables(&meta, &weekly);
    let observations = Observation::from_table(&players);

    println!("Players: {} rows", players.len());
    println!(
        "Meta snapshot: {} rows, weekly aggregate: {} rows",
        meta.len(),
        weekly.len()
    );
    let unidentified = observations
        .iter()
        .filter(|obs| obs.player_id.is_empty())
        .count();
    if unidentified > 0 {
        println!("[WARN] {unidentified} rows have no player_id; they are scored but unlabeled");
    }

    let mut store = open_store(&args)?;
    let run = scheduler::run(
        &observations,
        catalog,
        &meta_index,
        &config,
        store.as_mut(),
    )?;

    let wide = output::assemble(&players, &run.matrix, catalog)?;
    let final_table = if args.top_k > 0 {
        output::append_top_k(&wide, &run.matrix, catalog, args.top_k)?
    } else {
        wide
    };
    final_table
        .write_csv(&args.out)
        .context("write scored output table")?;

    if let Some(xlsx) = &args.xlsx {
        let k = if args.top_k > 0 { args.top_k } else { 5 };
        output::export_top_picks_xlsx(xlsx, &players, &run.matrix, catalog, k)?;
        println!("Top picks workbook: {}", xlsx.display());
    }

    println!("Scoring complete");
    println!("Output: {}", args.out.display());
    println!(
        "Rows scored: {} ({} resumed from checkpoint)",
        run.summary.total_rows, run.summary.resumed_rows
    );
    println!(
        "Batches: {} x {}",
        run.summary.batches_run, run.summary.batch_size
    );

    if !run.traces.is_empty() {
        let champ = config.debug_champion.as_deref().unwrap_or("?");
        println!();
        println!("Debug audit for {champ}:");
        println!("row | player | base | after_tier | counter | masked | final");
        for trace in &run.traces {
            let masked = trace
                .masked
                .map(|m| format!("{m:?}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{} | {} | {:.4} | {:.4} | {:.2} | {} | {:.4}",
                trace.row,
                trace.player,
                trace.base,
                trace.after_tier,
                trace.counter_penalty,
                masked,
                trace.final_score,
            );
            if !trace.countered_by.is_empty() {
                println!("      countered by: {}", trace.countered_by.join(", "));
            }
        }
    }

    Ok(())
}

fn open_store(args: &CliArgs) -> Result<Box<dyn CheckpointStore>> {
    if let Some(db) = &args.checkpoint_db {
        return Ok(Box::new(SqliteCheckpointStore::open(db)?));
    }
    let path = args
        .checkpoint
        .clone()
        .unwrap_or_else(|| args.out.with_extension("checkpoint.json"));
    Ok(Box::new(JsonCheckpointStore::new(path)))
}

fn parse_args() -> Result<CliArgs> {
    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    if raw.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", usage());
        std::process::exit(0);
    }

    let mut players = None;
    let mut meta = None;
    let mut weekly = None;
    let mut out = PathBuf::from("scored_players.csv");
    let mut checkpoint = None;
    let mut checkpoint_db = None;
    let mut batch_size = None;
    let mut no_team_comp = false;
    let mut test_mode = false;
    let mut debug = None;
    let mut top_k = 5usize;
    let mut xlsx = None;

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
            "--players" => players = Some(PathBuf::from(value(&mut idx)?)),
            "--meta" => meta = Some(PathBuf::from(value(&mut idx)?)),
            "--weekly" => weekly = Some(PathBuf::from(value(&mut idx)?)),
            "--out" => out = PathBuf::from(value(&mut idx)?),
            "--checkpoint" => checkpoint = Some(PathBuf::from(value(&mut idx)?)),
            "--checkpoint-db" => checkpoint_db = Some(PathBuf::from(value(&mut idx)?)),
            "--batch-size" => {
                batch_size = Some(
                    value(&mut idx)?
                        .parse::<usize>()
                        .context("parse --batch-size")?,
                )
            }
            "--no-team-comp" => no_team_comp = true,
            "--test-mode" => test_mode = true,
            "--debug" => debug = Some(value(&mut idx)?),
            "--top-k" => {
                top_k = value(&mut idx)?
                    .parse::<usize>()
                    .context("parse --top-k")?
            }
            "--xlsx" => xlsx = Some(PathBuf::from(value(&mut idx)?)),
            other => return Err(anyhow!("unknown argument: {other}")),
        }
        idx += 1;
    }

    Ok(CliArgs {
        players: players.ok_or_else(|| anyhow!("--players <csv> is required"))?,
        meta: meta.ok_or_else(|| anyhow!("--meta <csv> is required"))?,
        weekly: weekly.ok_or_else(|| anyhow!("--weekly <csv> is required"))?,
        out,
        checkpoint,
        checkpoint_db,
        batch_size,
        no_team_comp,
        test_mode,
        debug,
        top_k,
        xlsx,
    })
}

fn usage() -> &'static str {
    "draftscore --players <csv> --meta <csv> --weekly <csv> [options]

Options:
  --out <csv>            output path (default scored_players.csv)
  --checkpoint <json>    checkpoint file (default <out>.checkpoint.json)
  --checkpoint-db <db>   use a sqlite checkpoint store instead
  --batch-size <n>       rows per checkpointed batch (default 100)
  --no-team-comp         skip own/opponent-team masking and counter penalties
  --test-mode            score only the first 100 rows
  --debug <champion>     print per-row audit values for one champion
  --top-k <n>            ranked pick columns to append, 0 disables (default 5)
  --xlsx <path>          also write a top-picks workbook"
}
