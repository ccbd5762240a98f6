// Scenario Definitions — the preset candidate line-ups
// Each scenario is a named list of candidates compared side by side

use bandit_arena::{CandidateConfig, StrategyKind, VariantSeed};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub candidates: Vec<CandidateConfig>,
}

// ─── Variant Sets ───────────────────────────────────────────────────────────

fn four_arms() -> Vec<VariantSeed> {
    [0.1, 0.3, 0.7, 0.9].into_iter().map(VariantSeed::new).collect()
}

fn ten_arms() -> Vec<VariantSeed> {
    [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.9, 0.9, 0.9]
        .into_iter()
        .map(VariantSeed::new)
        .collect()
}

fn candidate(kind: StrategyKind, label: String, variants: Vec<VariantSeed>) -> CandidateConfig {
    CandidateConfig {
        label: Some(label),
        ..CandidateConfig::new(kind, variants)
    }
}

// ─── Scenarios ──────────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // Single default candidate: epsilon-greedy with a long reward delay.
        Scenario {
            name: "DEFAULT_ADDER",
            label: "Default candidate (delay 50)",
            candidates: vec![CandidateConfig {
                delay: 50,
                ..candidate(StrategyKind::EpsilonGreedy, "epsilon 0.1".to_string(), four_arms())
            }],
        },
        Scenario {
            name: "EPSILON_SWEEP",
            label: "Different values for epsilon (four variants)",
            candidates: [0.1, 0.3, 0.7, 1.0]
                .into_iter()
                .map(|epsilon| CandidateConfig {
                    epsilon,
                    delay: 10,
                    min_visits: 10.0,
                    ..candidate(
                        StrategyKind::EpsilonGreedy,
                        format!("epsilon {epsilon}"),
                        four_arms(),
                    )
                })
                .collect(),
        },
        Scenario {
            name: "GREEDY_VS_DECAY",
            label: "Epsilon greedy vs decay (ten variants)",
            candidates: vec![
                CandidateConfig {
                    epsilon: 0.1,
                    ..candidate(StrategyKind::EpsilonGreedy, "epsilon 0.1".to_string(), ten_arms())
                },
                CandidateConfig {
                    decay_factor: 7.0,
                    ..candidate(StrategyKind::EpsilonGreedyDecay, "decay 7".to_string(), ten_arms())
                },
            ],
        },
        Scenario {
            name: "ALL_STRATEGIES",
            label: "Every strategy on four variants",
            candidates: StrategyKind::ALL
                .into_iter()
                .map(|kind| candidate(kind, kind.to_string(), four_arms()))
                .collect(),
        },
        Scenario {
            name: "DELAY_SWEEP",
            label: "Reward delay sensitivity (epsilon-greedy)",
            candidates: [0, 10, 50, 200]
                .into_iter()
                .map(|delay| CandidateConfig {
                    delay,
                    ..candidate(StrategyKind::EpsilonGreedy, format!("delay {delay}"), four_arms())
                })
                .collect(),
        },
    ]
}
