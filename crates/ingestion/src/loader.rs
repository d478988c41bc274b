//! Log loaders
//!
//! A loader turns a recorded flight into the three pre-loaded, time-ordered
//! sample sequences consumed by the replay engine.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use contracts::{FixSample, InertialSample, ReferenceSample, SampleStreams};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};

/// Source of pre-loaded sample streams
pub trait LogLoader {
    /// Human readable source description (logging only)
    fn describe(&self) -> String;

    /// Load all three streams
    ///
    /// # Errors
    /// Fails when the source cannot be read or a stream is not time-ordered.
    fn load(&self) -> Result<SampleStreams>;
}

/// One line of a JSON-lines flight log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stream", rename_all = "snake_case")]
enum LogRecord {
    Imu(InertialSample),
    Fix(FixSample),
    Reference(ReferenceSample),
}

impl LogRecord {
    fn timestamp(&self) -> f64 {
        match self {
            LogRecord::Imu(s) => s.timestamp,
            LogRecord::Fix(s) => s.timestamp,
            LogRecord::Reference(s) => s.timestamp,
        }
    }
}

/// JSON-lines flight log
///
/// One object per line, tagged by `"stream": "imu" | "fix" | "reference"`.
/// Streams may be interleaved; each must be non-decreasing in time on its
/// own. Blank lines and lines starting with `#` are ignored.
///
/// ```text
/// {"stream":"imu","timestamp":0.01,"gyro":{"x":0,"y":0,"z":0},"accel":{"x":0,"y":0,"z":-9.81},"mag":{"x":0.2,"y":0,"z":0.4}}
/// {"stream":"fix","timestamp":0.2,"position":{"latitude":47.4,"longitude":8.5,"altitude":500},"velocity":{"north":30,"east":0,"down":0}}
/// ```
#[derive(Debug, Clone)]
pub struct JsonlLoader {
    path: PathBuf,
}

impl JsonlLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a log from any buffered reader
    pub fn read_from<R: BufRead>(reader: R) -> Result<SampleStreams> {
        let mut streams = SampleStreams::default();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let record: LogRecord =
                serde_json::from_str(trimmed).map_err(|e| IngestionError::ParseFailed {
                    line: line_no,
                    message: e.to_string(),
                })?;

            let timestamp = record.timestamp();
            if !timestamp.is_finite() {
                return Err(IngestionError::ParseFailed {
                    line: line_no,
                    message: format!("timestamp must be finite, got {timestamp}"),
                });
            }

            match record {
                LogRecord::Imu(sample) => {
                    let previous = streams.inertial.last().map(|s| s.timestamp);
                    ensure_ordered("imu", line_no, timestamp, previous)?;
                    streams.inertial.push(sample);
                }
                LogRecord::Fix(sample) => {
                    let previous = streams.fixes.last().map(|s| s.timestamp);
                    ensure_ordered("fix", line_no, timestamp, previous)?;
                    streams.fixes.push(sample);
                }
                LogRecord::Reference(sample) => {
                    ensure_ordered(
                        "reference",
                        line_no,
                        timestamp,
                        streams.references.last().map(|s| s.timestamp),
                    )?;
                    streams.references.push(sample);
                }
            }
        }

        Ok(streams)
    }
}

impl LogLoader for JsonlLoader {
    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }

    #[instrument(name = "jsonl_load", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<SampleStreams> {
        let file = File::open(&self.path).map_err(|source| IngestionError::Open {
            path: self.path.clone(),
            source,
        })?;
        let streams = Self::read_from(BufReader::new(file))?;

        record_loaded(&streams);
        info!(
            inertial = streams.inertial.len(),
            fixes = streams.fixes.len(),
            references = streams.references.len(),
            "flight log loaded"
        );
        Ok(streams)
    }
}

fn ensure_ordered(
    stream: &'static str,
    line: usize,
    timestamp: f64,
    previous: Option<f64>,
) -> Result<()> {
    match previous {
        Some(previous) if timestamp < previous => Err(IngestionError::OutOfOrder {
            stream,
            line,
            timestamp,
            previous,
        }),
        _ => Ok(()),
    }
}

/// Publish per-stream sample counts
pub(crate) fn record_loaded(streams: &SampleStreams) {
    metrics::counter!("ingestion_samples_total", "stream" => "imu")
        .increment(streams.inertial.len() as u64);
    metrics::counter!("ingestion_samples_total", "stream" => "fix")
        .increment(streams.fixes.len() as u64);
    metrics::counter!("ingestion_samples_total", "stream" => "reference")
        .increment(streams.references.len() as u64);
}

/// Write streams as a JSON-lines log, interleaved by timestamp
///
/// At equal timestamps the order is imu, fix, reference.
pub fn write_jsonl<W: Write>(streams: &SampleStreams, mut writer: W) -> Result<()> {
    let mut records: Vec<LogRecord> =
        Vec::with_capacity(streams.inertial.len() + streams.fixes.len() + streams.references.len());
    records.extend(streams.inertial.iter().copied().map(LogRecord::Imu));
    records.extend(streams.fixes.iter().copied().map(LogRecord::Fix));
    records.extend(streams.references.iter().copied().map(LogRecord::Reference));
    records.sort_by(|a, b| a.timestamp().total_cmp(&b.timestamp()));

    for record in &records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    debug!(records = records.len(), "flight log written");
    Ok(())
}
