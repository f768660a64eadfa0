use serde::{Deserialize, Serialize};

/// Dense row-major score matrix: one row per observation, one column per
/// catalog champion. Rows before the completion frontier hold real scores;
/// the rest stay zero until their batch lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    columns: usize,
    values: Vec<f64>,
}

impl ScoreMatrix {
    pub fn zeroed(rows: usize, columns: usize) -> Self {
        Self {
            columns,
            values: vec![0.0; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.values.len() / self.columns
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.columns;
        &self.values[start..start + self.columns]
    }

    pub fn set_row(&mut self, idx: usize, scores: &[f64]) {
        debug_assert_eq!(scores.len(), self.columns);
        let start = idx * self.columns;
        self.values[start..start + self.columns].copy_from_slice(scores);
    }

    /// Flat copy of the first `rows` rows, for checkpoint snapshots.
    pub fn prefix(&self, rows: usize) -> Vec<f64> {
        self.values[..rows * self.columns].to_vec()
    }

    /// Restore a checkpointed prefix into the front of the matrix.
    pub fn restore_prefix(&mut self, scores: &[f64]) {
        self.values[..scores.len()].copy_from_slice(scores);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
