//! Replay statistics and summary output.

use std::time::Duration;

use contracts::{RunStats, SampleStreams};
use observability::{ReplayMetricsAggregator, ReplaySummary, StatsSummary};
use replay_engine::HarnessReport;
use serde::Serialize;

/// Per-filter line of the summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_latency_us: Option<StatsSummary>,
}

/// Statistics from a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayStats {
    /// Sample source description
    pub source: String,

    pub inertial_samples: usize,
    pub fix_samples: usize,
    pub reference_samples: usize,

    /// Fixes dropped by the fix cutoff
    pub fixes_removed: usize,

    /// Total wall-clock time including loading
    pub duration_s: f64,

    /// One entry per filter, in registration order
    pub runs: Vec<RunSummary>,

    /// Run time of each filter against the first successful one
    pub comparisons: Vec<String>,

    pub summary: ReplaySummary,
}

impl ReplayStats {
    pub fn collect(
        source: String,
        streams: &SampleStreams,
        fixes_removed: usize,
        report: &HarnessReport,
        duration: Duration,
    ) -> Self {
        let mut aggregator = ReplayMetricsAggregator::new();
        let runs = report
            .runs
            .iter()
            .map(|run| match &run.outcome {
                Ok(r) => {
                    aggregator.update(&r.stats, r.elapsed);
                    RunSummary {
                        name: run.name.clone(),
                        ok: true,
                        error: None,
                        phase: None,
                        stats: Some(r.stats.clone()),
                        elapsed_ms: Some(r.elapsed.as_secs_f64() * 1000.0),
                        call_latency_us: Some(r.call_latency_us.clone()),
                    }
                }
                Err(e) => {
                    aggregator.record_failure(&run.name);
                    RunSummary {
                        name: run.name.clone(),
                        ok: false,
                        error: Some(e.to_string()),
                        phase: e.phase().map(|p| p.to_string()),
                        stats: None,
                        elapsed_ms: None,
                        call_latency_us: None,
                    }
                }
            })
            .collect();

        let mut successful = report.successful();
        let comparisons = match successful.next() {
            Some(baseline) => successful
                .filter_map(|other| report.relative_speed(&baseline.filter, &other.filter))
                .map(|speed| speed.to_string())
                .collect(),
            None => Vec::new(),
        };

        Self {
            source,
            inertial_samples: streams.inertial.len(),
            fix_samples: streams.fixes.len(),
            reference_samples: streams.references.len(),
            fixes_removed,
            duration_s: duration.as_secs_f64(),
            runs,
            comparisons,
            summary: aggregator.summary(),
        }
    }

    /// Whether every filter run failed
    pub fn all_failed(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|r| !r.ok)
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Replay Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("Input");
        println!("   ├─ Source: {}", self.source);
        println!("   ├─ Inertial samples: {}", self.inertial_samples);
        println!("   ├─ Fix samples: {}", self.fix_samples);
        if self.fixes_removed > 0 {
            println!("   ├─ Fixes removed by cutoff: {}", self.fixes_removed);
        }
        println!("   ├─ Reference samples: {}", self.reference_samples);
        println!("   └─ Duration: {:.3}s", self.duration_s);

        println!("\nFilters ({})", self.runs.len());
        for (i, run) in self.runs.iter().enumerate() {
            let is_last = i == self.runs.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            let child = if is_last { "   " } else { "│  " };

            match (&run.stats, &run.error) {
                (Some(stats), _) => {
                    println!("   {} {} ✓", prefix, run.name);
                    println!(
                        "   {}  ├─ window: {}..{} ({} steps)",
                        child, stats.k_start, stats.k_end, stats.steps
                    );
                    match stats.init_time {
                        Some(t) => println!("   {}  ├─ init at t={:.3}s", child, t),
                        None if stats.solutions > 0 => {
                            println!("   {}  ├─ init skipped", child)
                        }
                        None => println!("   {}  ├─ never initialized", child),
                    }
                    println!("   {}  ├─ solutions: {}", child, stats.solutions);
                    if stats.reference_lag_steps > 0 {
                        println!(
                            "   {}  ├─ reference lag steps: {}",
                            child, stats.reference_lag_steps
                        );
                    }
                    if let Some(latency) = &run.call_latency_us {
                        println!("   {}  ├─ call latency (µs): {}", child, latency);
                    }
                    let seconds = run.elapsed_ms.unwrap_or(0.0) / 1000.0;
                    println!("   {}  └─ time: {:.4}s", child, seconds);
                }
                (None, Some(error)) => {
                    println!("   {} {} ✗", prefix, run.name);
                    println!("   {}  └─ {}", child, error);
                }
                (None, None) => println!("   {} {}", prefix, run.name),
            }
        }

        if !self.comparisons.is_empty() {
            println!("\nComparison");
            for line in &self.comparisons {
                println!("   • {}", line);
            }
        }

        println!("\n{}", self.summary);
    }
}
