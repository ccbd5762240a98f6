// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Multi-Armed Bandit Strategy Comparison Engine

pub mod types;
pub mod sampler;
pub mod strategy;
pub mod delay_queue;
pub mod simulation;
pub mod metrics;
pub mod context;
#[cfg(not(target_arch = "wasm32"))]
pub mod orchestrator;

pub use types::*;
pub use context::{run_context, CompletionResponse, StartRequest};
pub use metrics::{MetricKind, RunMetrics, Stats, DATA_POINTS};
pub use simulation::{run_seeded, RunLedger, RunState, SimulationRun};
pub use strategy::SelectionStrategy;
#[cfg(not(target_arch = "wasm32"))]
pub use orchestrator::{
    chart_tables, CandidateResult, ChartTable, OrchestratorConfig, OrchestratorError,
    SimulationOrchestrator,
};

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────
//
// One worker executes one context per `start` message. The browser host owns
// the fan-out across workers and the averaging across repeats.

#[wasm_bindgen]
pub struct ArenaWorker {
    completed_runs: u32,
}

#[wasm_bindgen]
impl ArenaWorker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self { completed_runs: 0 }
    }

    /// Handle a `start` message: `{candidateConfig, iterations, index, seed}`.
    /// Resolves to `{index, cumulativeReward, cumulativeRegret, bestArmUsage}`.
    pub fn start(&mut self, request: JsValue) -> Result<JsValue, JsError> {
        let request: StartRequest = serde_wasm_bindgen::from_value(request)?;
        let response = run_context(&request)?;
        self.completed_runs += 1;
        log(&format!(
            "context {} complete ({} runs so far)",
            response.index, self.completed_runs
        ));
        Ok(serde_wasm_bindgen::to_value(&response)?)
    }

    pub fn completed_runs(&self) -> u32 {
        self.completed_runs
    }
}

impl Default for ArenaWorker {
    fn default() -> Self {
        Self::new()
    }
}
