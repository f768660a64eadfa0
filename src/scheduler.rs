use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::checkpoint::{CheckpointState, CheckpointStore};
use crate::config::{ScoringConfig, TEST_MODE_ROWS};
use crate::matrix::ScoreMatrix;
use crate::meta::MetaIndex;
use crate::observation::Observation;
use crate::penalty::{PenaltyEngine, ScoreTrace};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_rows: usize,
    /// Rows already committed by a previous run and skipped here.
    pub resumed_rows: usize,
    pub batches_run: usize,
    pub batch_size: usize,
    pub started_at: String,
    pub finished_at: String,
}

#[derive(Debug)]
pub struct RunOutput {
    pub matrix: ScoreMatrix,
    pub traces: Vec<ScoreTrace>,
    pub summary: RunSummary,
}

/// Rows actually scored, after the test-mode prefix cut.
pub fn effective_rows(config: &ScoringConfig, total: usize) -> usize {
    if config.test_mode {
        total.min(TEST_MODE_ROWS)
    } else {
        total
    }
}

/// Score every observation against every catalog champion in checkpointed
/// batches.
///
/// Batches are committed through the store after each one completes, so a
/// crash redoes at most the in-flight batch on the next run (at-least-once;
/// scoring is pure, so the redo is idempotent). The checkpoint artifact is
/// removed once the final batch lands.
pub fn run(
    observations: &[Observation],
    catalog: &Catalog,
    meta: &MetaIndex,
    config: &ScoringConfig,
    store: &mut dyn CheckpointStore,
) -> Result<RunOutput> {
    config.validate()?;
    let started_at = Utc::now().to_rfc3339();

    let rows = effective_rows(config, observations.len());
    if config.test_mode && rows < observations.len() {
        println!("Test mode: scoring only the first {rows} rows");
    }

    let mut matrix = ScoreMatrix::zeroed(rows, catalog.len());
    let mut start_row = 0usize;
    match store.load() {
        Ok(Some(state)) if state.is_resumable(catalog, rows) => {
            matrix.restore_prefix(&state.scores);
            start_row = state.rows_completed;
            println!("Resuming from checkpoint: {start_row} rows already completed");
        }
        Ok(Some(_)) => {
            println!("[WARN] checkpoint does not match current inputs, starting from row 0");
        }
        Ok(None) => {}
        Err(err) => {
            println!("[WARN] checkpoint unreadable ({err:#}), starting from row 0");
        }
    }

    let engine = PenaltyEngine::new(catalog, meta, config);
    let debug_champ = config
        .debug_champion
        .as_deref()
        .filter(|name| catalog.contains(name));
    if let (Some(requested), None) = (config.debug_champion.as_deref(), debug_champ) {
        println!("[WARN] debug champion {requested:?} is not in the catalog, ignoring");
    }

    let mut traces = Vec::new();
    let mut batches_run = 0usize;

    let mut batch_start = start_row;
    while batch_start < rows {
        let batch_end = (batch_start + config.batch_size).min(rows);
        println!(
            "Scoring rows {batch_start}..{batch_end} of {rows} ({:.1}% done)",
            batch_start as f64 / rows as f64 * 100.0
        );

        // Workers only read the catalog, meta index and observations; the
        // matrix is written single-threaded after the gather.
        let scored: Vec<Vec<f64>> = observations[batch_start..batch_end]
            .par_iter()
            .map(|obs| engine.score_row(obs))
            .collect();
        for (offset, row_scores) in scored.iter().enumerate() {
            matrix.set_row(batch_start + offset, row_scores);
        }

        if let Some(champ) = debug_champ {
            for (offset, obs) in observations[batch_start..batch_end].iter().enumerate() {
                traces.push(engine.trace_cell(obs, champ, batch_start + offset));
            }
        }

        save_with_retry(store, catalog, &matrix, batch_end, config).with_context(|| {
            format!(
                "run aborted; rows {batch_start}..{batch_end} lost, \
                 last good checkpoint covers rows 0..{batch_start}"
            )
        })?;

        batches_run += 1;
        batch_start = batch_end;
    }

    store
        .clear()
        .context("remove checkpoint after completed run")?;

    Ok(RunOutput {
        matrix,
        traces,
        summary: RunSummary {
            total_rows: rows,
            resumed_rows: start_row,
            batches_run,
            batch_size: config.batch_size,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        },
    })
}

fn save_with_retry(
    store: &mut dyn CheckpointStore,
    catalog: &Catalog,
    matrix: &ScoreMatrix,
    rows_completed: usize,
    config: &ScoringConfig,
) -> Result<()> {
    let attempts = config.checkpoint_retries.max(1);
    let mut last_err = anyhow!("checkpoint save never attempted");
    for attempt in 1..=attempts {
        let state = CheckpointState::new(rows_completed, catalog, matrix.prefix(rows_completed));
        match store.save(&state) {
            Ok(()) => return Ok(()),
            Err(err) => {
                println!("[WARN] checkpoint write failed (attempt {attempt}/{attempts}): {err:#}");
                last_err = err;
            }
        }
    }
    Err(last_err.context(format!("checkpoint write failed after {attempts} attempts")))
}
