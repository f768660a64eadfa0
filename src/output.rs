use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::catalog::Catalog;
use crate::matrix::ScoreMatrix;
use crate::table::Table;

/// One entry of the top-K convenience view.
#[derive(Debug, Clone, PartialEq)]
pub struct TopPick {
    pub rank: usize,
    pub champion: String,
    pub score: f64,
}

/// Merge the original observation columns with one score column per catalog
/// champion. Column order: input columns first, then the roster in catalog
/// order. The matrix may cover a prefix of the input (test mode); only
/// covered rows appear in the output.
pub fn assemble(input: &Table, matrix: &ScoreMatrix, catalog: &Catalog) -> Result<Table> {
    if matrix.columns() != catalog.len() {
        return Err(anyhow!(
            "matrix has {} columns but catalog has {} champions",
            matrix.columns(),
            catalog.len()
        ));
    }
    if matrix.rows() > input.len() {
        return Err(anyhow!(
            "matrix covers {} rows but input has only {}",
            matrix.rows(),
            input.len()
        ));
    }

    let mut headers = input.headers().to_vec();
    headers.extend(catalog.names().iter().cloned());
    let mut out = Table::new(headers);

    for idx in 0..matrix.rows() {
        let original = input
            .row(idx)
            .ok_or_else(|| anyhow!("input row {idx} missing"))?;
        let mut cells = original.to_vec();
        cells.extend(matrix.row(idx).iter().map(|score| score.to_string()));
        out.push_row(cells)?;
    }
    Ok(out)
}

/// The K best champions for one score row. Ties resolve in catalog order,
/// so equal scores keep a stable, reproducible ranking.
pub fn top_k_row(scores: &[f64], catalog: &Catalog, k: usize) -> Vec<TopPick> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| {
        scores[*b]
            .partial_cmp(&scores[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    order
        .into_iter()
        .take(k)
        .enumerate()
        .filter_map(|(rank, col)| {
            let champion = catalog.names().get(col)?.clone();
            Some(TopPick {
                rank: rank + 1,
                champion,
                score: scores[col],
            })
        })
        .collect()
}

/// Append `N_champ_name` / `N_champ_score` columns (the downstream training
/// artifact's naming) to an assembled wide table.
pub fn append_top_k(
    wide: &Table,
    matrix: &ScoreMatrix,
    catalog: &Catalog,
    k: usize,
) -> Result<Table> {
    if matrix.rows() != wide.len() {
        return Err(anyhow!(
            "wide table has {} rows but matrix has {}",
            wide.len(),
            matrix.rows()
        ));
    }
    let mut headers = wide.headers().to_vec();
    for rank in 1..=k {
        headers.push(format!("{rank}_champ_name"));
        headers.push(format!("{rank}_champ_score"));
    }
    let mut out = Table::new(headers);

    for idx in 0..wide.len() {
        let mut cells = wide
            .row(idx)
            .ok_or_else(|| anyhow!("wide row {idx} missing"))?
            .to_vec();
        let picks = top_k_row(matrix.row(idx), catalog, k);
        for rank in 1..=k {
            match picks.get(rank - 1) {
                Some(pick) => {
                    cells.push(pick.champion.clone());
                    cells.push(pick.score.to_string());
                }
                None => {
                    cells.push(String::new());
                    cells.push("0".to_string());
                }
            }
        }
        out.push_row(cells)?;
    }
    Ok(out)
}

/// Write the top-K view as a report workbook: one row per observation with
/// player identity and the ranked picks.
pub fn export_top_picks_xlsx(
    path: &Path,
    input: &Table,
    matrix: &ScoreMatrix,
    catalog: &Catalog,
    k: usize,
) -> Result<()> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(matrix.rows() + 1);
    let mut header = vec!["Player".to_string(), "Region".to_string()];
    for rank in 1..=k {
        header.push(format!("Pick {rank}"));
        header.push(format!("Score {rank}"));
    }
    rows.push(header);

    for idx in 0..matrix.rows() {
        let mut row = vec![
            input.cell(idx, "player_id").unwrap_or_default().to_string(),
            input.cell(idx, "region").unwrap_or_default().to_string(),
        ];
        for pick in top_k_row(matrix.row(idx), catalog, k) {
            row.push(pick.champion);
            row.push(format!("{:.4}", pick.score));
        }
        rows.push(row);
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("TopPicks")?;
    write_rows(sheet, &rows)?;
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
