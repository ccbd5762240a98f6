// Benchmark Report Types
// Structured JSON output so averaged series can be charted by any tool

use bandit_arena::{CandidateResult, ChartTable};
use serde::Serialize;

// ─── Scenario Report ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub scenario_name: String,
    pub label: String,
    pub repeats: usize,
    pub pulls_per_run: u64,
    pub elapsed_ms: u128,
    pub candidates: Vec<CandidateResult>,
    pub charts: Vec<ChartTable>,
}

impl ScenarioReport {
    /// Candidate with the lowest mean final regret.
    pub fn leader(&self) -> Option<&CandidateResult> {
        self.candidates
            .iter()
            .min_by(|a, b| a.final_regret.mean.total_cmp(&b.final_regret.mean))
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub base_seed: u64,
    pub summary: Summary,
    pub scenarios: Vec<ScenarioReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}
