// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Execution Context Messages
//
// The boundary around one isolated run: a start request goes in, a completion
// response with the display series comes out. Orchestrator threads and the
// WASM entry point both go through here.

use serde::{Deserialize, Serialize};

use crate::metrics::RunMetrics;
use crate::simulation::run_seeded;
use crate::types::{CandidateConfig, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub candidate_config: CandidateConfig,
    /// Overrides the candidate's own `iterations` when present.
    #[serde(default)]
    pub iterations: Option<u64>,
    /// Position of the candidate, echoed back in the response.
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub index: usize,
    #[serde(flatten)]
    pub metrics: RunMetrics,
}

impl StartRequest {
    pub fn new(candidate_config: CandidateConfig, index: usize, seed: u64) -> Self {
        Self {
            candidate_config,
            iterations: None,
            index,
            seed,
        }
    }

    /// The candidate as it will actually run.
    pub fn effective_config(&self) -> CandidateConfig {
        let mut config = self.candidate_config.clone();
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        config
    }
}

/// Execute one context: run the candidate and reduce its ledgers.
///
/// # Errors
///
/// Returns [`ConfigError`] if the candidate fails validation.
pub fn run_context(request: &StartRequest) -> Result<CompletionResponse, ConfigError> {
    let config = request.effective_config();
    let state = run_seeded(&config, request.seed)?;
    Ok(CompletionResponse {
        index: request.index,
        metrics: RunMetrics::from_ledger(&state.ledger, &config.variants),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DATA_POINTS;
    use crate::types::{StrategyKind, VariantSeed};

    #[test]
    fn test_parse_start_request() {
        let json = r#"{
            "candidateConfig": {
                "type": "epsilon-greedy-decay",
                "decayFactor": "7",
                "variants": [{"ev": 0.1, "r": 1}, {"ev": 0.9, "r": 1}]
            },
            "iterations": 500,
            "index": 2,
            "seed": 17
        }"#;
        let req: StartRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.index, 2);
        assert_eq!(req.effective_config().iterations, 500);
        assert_eq!(req.candidate_config.kind, StrategyKind::EpsilonGreedyDecay);
    }

    #[test]
    fn test_response_shape() {
        let cfg = CandidateConfig::new(
            StrategyKind::Softmax,
            vec![VariantSeed::new(0.4), VariantSeed::new(0.6)],
        );
        let resp = run_context(&StartRequest::new(cfg, 3, 1)).unwrap();
        assert_eq!(resp.index, 3);
        assert_eq!(resp.metrics.cumulative_reward.len(), DATA_POINTS);
        assert_eq!(resp.metrics.cumulative_regret.len(), DATA_POINTS);
        assert_eq!(resp.metrics.best_arm_usage.len(), DATA_POINTS);

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("cumulativeReward").is_some());
        assert!(json.get("bestArmUsage").is_some());
    }

    #[test]
    fn test_invalid_candidate_surfaces_error() {
        let cfg = CandidateConfig::new(StrategyKind::Ucb, vec![]);
        assert_eq!(
            run_context(&StartRequest::new(cfg, 0, 0)),
            Err(ConfigError::NoVariants)
        );
    }
}
