//! Local history of finished sessions, one CSV row per attempt.

use crate::clock::Clock;
use crate::error::Result;
use crate::session::{Phase, Session};
use crate::util::mean;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub date: DateTime<Local>,
    /// Round identifier, empty for practice.
    pub round: String,
    pub duration_secs: u32,
    pub elapsed_secs: f64,
    pub wpm: u32,
    pub accuracy: u32,
    pub competition: bool,
}

impl ResultRecord {
    /// Snapshot of a finished session; `None` while it is still running.
    pub fn from_session<C: Clock>(session: &Session<C>, round: Option<&str>) -> Option<Self> {
        if session.phase() != Phase::Finished {
            return None;
        }
        let score = session.score();
        Some(Self {
            date: Local::now(),
            round: round.unwrap_or_default().to_string(),
            duration_secs: session.config().duration_secs,
            elapsed_secs: (session.elapsed().as_secs_f64() * 100.0).round() / 100.0,
            wpm: score.wpm,
            accuracy: score.accuracy,
            competition: session.is_competition(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A fresh file needs the header row
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// All recorded attempts, oldest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<ResultRecord>() {
            records.push(row?);
        }
        Ok(records)
    }
}

pub fn best_wpm(records: &[ResultRecord]) -> u32 {
    records.iter().map(|r| r.wpm).max().unwrap_or(0)
}

pub fn average_accuracy(records: &[ResultRecord]) -> Option<f64> {
    let values: Vec<f64> = records.iter().map(|r| r.accuracy as f64).collect();
    mean(&values)
}
