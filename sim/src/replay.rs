//! Replay: serialize/deserialize simulation logs for offline analysis.

use fieldmap_core::types::{ClassId, DetectionBatch};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A full recorded simulation log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayLog {
    pub scenario_name: String,
    pub seed: u64,
    pub sim_dt: f64,
    pub duration: f64,
    /// All camera batches in chronological order
    pub batches: Vec<DetectionBatch>,
    /// Ground-truth object states, sampled every `sim_dt`
    pub ground_truth: Vec<TruthFrame>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TruthFrame {
    pub time: f64,
    pub objects: Vec<TruthState>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TruthState {
    pub id: u64,
    pub class: ClassId,
    pub state: [f64; 4],
}

/// Save a replay log to a JSON file.
pub fn save_replay(log: &ReplayLog, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}

/// Load a replay log from a JSON file.
pub fn load_replay(path: &Path) -> anyhow::Result<ReplayLog> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let log: ReplayLog = serde_json::from_reader(reader)?;
    Ok(log)
}
