use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

pub const CHECKPOINT_VERSION: u32 = 1;

/// Versioned snapshot of a partially-scored run: the completion frontier
/// plus the score prefix for every fully-committed batch. The catalog names
/// are embedded so a roster change invalidates stale snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub version: u32,
    pub rows_completed: usize,
    pub catalog: Vec<String>,
    pub scores: Vec<f64>,
    pub saved_at: String,
}

impl CheckpointState {
    pub fn new(rows_completed: usize, catalog: &Catalog, scores: Vec<f64>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            rows_completed,
            catalog: catalog.names().to_vec(),
            scores,
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    /// Whether this snapshot can seed a resume against the given inputs.
    pub fn is_resumable(&self, catalog: &Catalog, total_rows: usize) -> bool {
        self.version == CHECKPOINT_VERSION
            && self.rows_completed <= total_rows
            && self.catalog == catalog.names()
            && self.scores.len() == self.rows_completed * catalog.len()
    }
}

/// Storage seam for checkpoint snapshots. Any backend works as long as a
/// reader never observes a half-written snapshot.
pub trait CheckpointStore {
    fn load(&mut self) -> Result<Option<CheckpointState>>;
    fn save(&mut self, state: &CheckpointState) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// JSON file backend. Saves go through a temp file and rename, so a crash
/// mid-write leaves the previous snapshot intact.
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&mut self) -> Result<Option<CheckpointState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read checkpoint {}", self.path.display()))?;
        let state = serde_json::from_str::<CheckpointState>(&raw)
            .with_context(|| format!("decode checkpoint {}", self.path.display()))?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &CheckpointState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(state).context("serialize checkpoint")?;
        fs::write(&tmp, json).with_context(|| format!("write checkpoint {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).context("swap checkpoint into place")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove checkpoint {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Sqlite backend: a single-row snapshot table, replaced transactionally on
/// every save.
pub struct SqliteCheckpointStore {
    conn: Connection,
}

impl SqliteCheckpointStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open checkpoint db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().context("open in-memory db")?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            CREATE TABLE IF NOT EXISTS checkpoint (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL,
                rows_completed INTEGER NOT NULL,
                catalog_json TEXT NOT NULL,
                scores_json TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );
            "#,
        )
        .context("create checkpoint schema")?;
        Ok(Self { conn })
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn load(&mut self) -> Result<Option<CheckpointState>> {
        let row = self
            .conn
            .query_row(
                "SELECT version, rows_completed, catalog_json, scores_json, saved_at
                 FROM checkpoint WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .context("query checkpoint row")?;

        let Some((version, rows_completed, catalog_json, scores_json, saved_at)) = row else {
            return Ok(None);
        };
        let catalog =
            serde_json::from_str::<Vec<String>>(&catalog_json).context("decode catalog json")?;
        let scores =
            serde_json::from_str::<Vec<f64>>(&scores_json).context("decode scores json")?;
        Ok(Some(CheckpointState {
            version,
            rows_completed: usize::try_from(rows_completed).unwrap_or(0),
            catalog,
            scores,
            saved_at,
        }))
    }

    fn save(&mut self, state: &CheckpointState) -> Result<()> {
        let catalog_json = serde_json::to_string(&state.catalog).context("serialize catalog")?;
        let scores_json = serde_json::to_string(&state.scores).context("serialize scores")?;
        self.conn
            .execute(
                r#"
                INSERT INTO checkpoint (id, version, rows_completed, catalog_json, scores_json, saved_at)
                VALUES (1, ?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    version = excluded.version,
                    rows_completed = excluded.rows_completed,
                    catalog_json = excluded.catalog_json,
                    scores_json = excluded.scores_json,
                    saved_at = excluded.saved_at
                "#,
                params![
                    state.version,
                    state.rows_completed as i64,
                    catalog_json,
                    scores_json,
                    state.saved_at,
                ],
            )
            .context("upsert checkpoint row")?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM checkpoint", [])
            .context("delete checkpoint row")?;
        Ok(())
    }
}
