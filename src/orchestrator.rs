// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Simulation Orchestrator
//
// Repeats run strictly one after another. Within a repeat every candidate
// gets its own thread and its own channel; the repeat ends only when every
// context has reported, bounded by a per-repeat deadline.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::{run_context, CompletionResponse, StartRequest};
use crate::metrics::{MetricKind, RunMetrics, Stats};
use crate::types::{CandidateConfig, ConfigError};

pub const DEFAULT_CONTEXT_TIMEOUT: Duration = Duration::from_secs(300);

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("no candidates to simulate")]
    NoCandidates,
    #[error("repeat count must be at least 1")]
    ZeroRepeats,
    #[error("candidate {candidate}: {source}")]
    Config {
        candidate: usize,
        #[source]
        source: ConfigError,
    },
    #[error("repeat {repeat}: candidate {candidate} did not report within {timeout:?}")]
    ContextTimeout {
        repeat: usize,
        candidate: usize,
        timeout: Duration,
    },
    #[error("repeat {repeat}: candidate {candidate} stopped without reporting")]
    ContextFailed { repeat: usize, candidate: usize },
}

// ─── Configuration ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Seed of the first context; context `c` of repeat `m` uses
    /// `base_seed + m * candidates + c`.
    pub base_seed: u64,
    /// Deadline for one repeat's batch of contexts.
    pub context_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_seed: 0,
            context_timeout: DEFAULT_CONTEXT_TIMEOUT,
        }
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Averaged outcome of one candidate over every repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub index: usize,
    pub label: String,
    pub repeats: usize,
    #[serde(flatten)]
    pub metrics: RunMetrics,
    pub final_reward: Stats,
    pub final_regret: Stats,
}

/// One chart's worth of data: a bucket-number label column plus one column
/// of averaged values per candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTable {
    pub metric: MetricKind,
    pub title: String,
    pub labels: Vec<String>,
    pub columns: Vec<ChartColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartColumn {
    pub candidate: String,
    pub values: Vec<f64>,
}

impl ChartTable {
    pub fn build(metric: MetricKind, results: &[CandidateResult]) -> Self {
        let width = results
            .iter()
            .map(|r| r.metrics.series(metric).len())
            .max()
            .unwrap_or(0);
        Self {
            metric,
            title: metric.title().to_string(),
            labels: (1..=width).map(|i| i.to_string()).collect(),
            columns: results
                .iter()
                .map(|r| ChartColumn {
                    candidate: r.label.clone(),
                    values: r.metrics.series(metric).to_vec(),
                })
                .collect(),
        }
    }
}

/// One table per metric.
pub fn chart_tables(results: &[CandidateResult]) -> Vec<ChartTable> {
    MetricKind::ALL
        .iter()
        .map(|&metric| ChartTable::build(metric, results))
        .collect()
}

// ─── Orchestrator ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SimulationOrchestrator {
    config: OrchestratorConfig,
}

impl SimulationOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Run every candidate `repeats` times with `pulls_per_run` steps each
    /// and average the metrics per candidate.
    ///
    /// # Errors
    ///
    /// Fails before any work starts on an empty candidate list, zero repeats,
    /// or an invalid candidate. Fails mid-way if a context misses the
    /// repeat's deadline or dies without reporting.
    pub fn run(
        &self,
        candidates: &[CandidateConfig],
        repeats: usize,
        pulls_per_run: u64,
    ) -> Result<Vec<CandidateResult>, OrchestratorError> {
        if candidates.is_empty() {
            return Err(OrchestratorError::NoCandidates);
        }
        if repeats == 0 {
            return Err(OrchestratorError::ZeroRepeats);
        }
        let candidates: Vec<CandidateConfig> = candidates
            .iter()
            .map(|c| CandidateConfig {
                iterations: pulls_per_run,
                ..c.clone()
            })
            .collect();
        for (candidate, config) in candidates.iter().enumerate() {
            config
                .validate()
                .map_err(|source| OrchestratorError::Config { candidate, source })?;
        }

        let started = Instant::now();
        let mut per_candidate: Vec<Vec<RunMetrics>> = vec![Vec::with_capacity(repeats); candidates.len()];

        for repeat in 0..repeats {
            let batch = self.run_repeat(&candidates, repeat)?;
            for response in batch {
                per_candidate[response.index].push(response.metrics);
            }
            info!(repeat = repeat + 1, of = repeats, "repeat complete");
        }

        let results: Vec<CandidateResult> = per_candidate
            .iter()
            .zip(candidates.iter())
            .enumerate()
            .map(|(index, (runs, config))| CandidateResult {
                index,
                label: config.display_label(index),
                repeats: runs.len(),
                metrics: average_metrics(runs),
                final_reward: final_stats(runs, MetricKind::CumulativeReward),
                final_regret: final_stats(runs, MetricKind::CumulativeRegret),
            })
            .collect();

        info!(
            candidates = results.len(),
            repeats,
            pulls_per_run,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "orchestration complete"
        );
        Ok(results)
    }

    /// Fan out one context per candidate and wait for all of them.
    fn run_repeat(
        &self,
        candidates: &[CandidateConfig],
        repeat: usize,
    ) -> Result<Vec<CompletionResponse>, OrchestratorError> {
        self.run_repeat_with(candidates, repeat, complete_context)
    }

    fn run_repeat_with(
        &self,
        candidates: &[CandidateConfig],
        repeat: usize,
        context: ContextFn,
    ) -> Result<Vec<CompletionResponse>, OrchestratorError> {
        let receivers: Vec<Receiver<CompletionResponse>> = candidates
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let seed = self.seed_for(repeat, index, candidates.len());
                let request = StartRequest::new(config.clone(), index, seed);
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    // A context that returns nothing or panics drops `tx`,
                    // and the receiver sees a disconnect.
                    if let Some(response) = context(&request) {
                        let _ = tx.send(response);
                    }
                });
                rx
            })
            .collect();

        let deadline = Instant::now() + self.config.context_timeout;
        let mut batch = Vec::with_capacity(receivers.len());
        for (candidate, rx) in receivers.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(response) => batch.push(response),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(repeat, candidate, "context timed out");
                    return Err(OrchestratorError::ContextTimeout {
                        repeat,
                        candidate,
                        timeout: self.config.context_timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(repeat, candidate, "context stopped without reporting");
                    return Err(OrchestratorError::ContextFailed { repeat, candidate });
                }
            }
        }
        Ok(batch)
    }

    fn seed_for(&self, repeat: usize, candidate: usize, width: usize) -> u64 {
        self.config
            .base_seed
            .wrapping_add((repeat as u64).wrapping_mul(width as u64))
            .wrapping_add(candidate as u64)
    }
}

/// Work performed by one context thread.
type ContextFn = fn(&StartRequest) -> Option<CompletionResponse>;

// Configs are validated before any thread starts.
fn complete_context(request: &StartRequest) -> Option<CompletionResponse> {
    run_context(request).ok()
}

// ─── Averaging ──────────────────────────────────────────────────────────────

/// Element-wise arithmetic mean of each series across runs.
pub fn average_metrics(runs: &[RunMetrics]) -> RunMetrics {
    let mut out = RunMetrics::default();
    if runs.is_empty() {
        return out;
    }
    let n = runs.len() as f64;
    for metric in MetricKind::ALL {
        let width = runs.iter().map(|r| r.series(metric).len()).min().unwrap_or(0);
        let mut sums = vec![0.0; width];
        for run in runs {
            for (sum, value) in sums.iter_mut().zip(run.series(metric)) {
                *sum += value;
            }
        }
        *out.series_mut(metric) = sums.into_iter().map(|s| s / n).collect();
    }
    out
}

fn final_stats(runs: &[RunMetrics], metric: MetricKind) -> Stats {
    let finals: Vec<f64> = runs.iter().map(|r| r.final_value(metric)).collect();
    Stats::from_samples(&finals)
}
