//! hw-logging: NDJSON run events and the run manifest.
//!
//! Append-only NDJSON logs for post-mortems of evacuation runs, plus a small
//! `run.json` manifest rewritten atomically as the run progresses.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run manifest schema version.
pub const RUN_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifestV1 {
    pub run_manifest_version: u32,

    pub run_id: String,
    pub created_ts_ms: u64,

    // Hashes for reproducibility.
    pub git_hash: Option<String>,
    pub config_hash: Option<String>,

    // Run inputs.
    pub seed: u64,
    pub strategy: String,
    pub sim_time: u32,
    pub width: u32,
    pub height: u32,

    // Layout.
    pub logs_dir: String,

    // Progress.
    pub steps_completed: u32,
    pub net_reward: Option<f64>,
    pub finished_ts_ms: Option<u64>,
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn try_git_hash() -> Option<String> {
    use std::process::Command;

    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8(out.stdout).ok()?;
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<RunManifestV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<RunManifestV1>(&bytes)?)
}

/// Write `m` to a sibling tmp file, then rename over `path`.
pub fn write_manifest_atomic(path: impl AsRef<Path>, m: &RunManifestV1) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// One executed policy step.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStepEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub run_id: String,

    pub step: u32,
    pub horizon: u32,
    /// Evacuated cells as `[x, y]` pairs.
    pub action: Vec<(u32, u32)>,

    pub reward: f64,
    pub cumulative_reward: f64,

    pub flooded_cells: usize,
    pub evacuated_cells: usize,
    pub total_water: f64,
}

impl PolicyStepEventV1 {
    pub const EVENT: &'static str = "policy_step";
}

/// Written once when a run finishes.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummaryEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,
    pub run_id: String,

    pub strategy: String,
    pub steps: u32,
    pub net_reward: f64,
    pub elapsed_ms: u64,

    pub flooded_cells: usize,
    pub evacuated_cells: usize,
    pub population_at_risk: f64,
}

impl RunSummaryEventV1 {
    pub const EVENT: &'static str = "run_summary";
}

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("log io error: {0}")]
    Io(#[from] io::Error),
    #[error("log json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
