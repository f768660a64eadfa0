//! Champion selection scoring engine.
//!
//! Turns per-player historical tables (recent, weekly, season, mastery) and
//! a global meta snapshot into a dense score matrix — one row per player
//! observation, one column per catalog champion — processed in checkpointed,
//! resumable batches.

pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod matrix;
pub mod meta;
pub mod observation;
pub mod output;
pub mod penalty;
pub mod scheduler;
pub mod signals;
pub mod synthetic;
pub mod table;
