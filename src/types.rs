// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Type Definitions

use serde::{Deserialize, Deserializer, Serialize};

// ─── Defaults ───────────────────────────────────────────────────────────────

pub const DEFAULT_ITERATIONS: u64 = 1000;
pub const DEFAULT_MIN_VISITS: f64 = 10.0;
pub const DEFAULT_EPSILON: f64 = 0.1;
pub const DEFAULT_DELAY: u64 = 10;
pub const DEFAULT_DECAY_FACTOR: f64 = 1.0;
pub const DEFAULT_TAU: f64 = 0.1;
pub const DEFAULT_REWARD: f64 = 1.0;

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Rejections raised while validating a candidate, before any step runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("candidate has no variants")]
    NoVariants,
    #[error("variant {index}: ev must be a probability in [0, 1], got {value}")]
    InvalidEv { index: usize, value: f64 },
    #[error("variant {index}: reward magnitude must be finite and positive, got {value}")]
    InvalidReward { index: usize, value: f64 },
    #[error("epsilon must be finite, and in [0, 1] for epsilon-greedy kinds, got {0}")]
    InvalidEpsilon(f64),
    #[error("decay factor must be finite and positive, got {0}")]
    InvalidDecayFactor(f64),
    #[error("tau must be finite and positive, got {0}")]
    InvalidTau(f64),
    #[error("min visits must be finite and non-negative, got {0}")]
    InvalidMinVisits(f64),
    #[error("iterations must be at least 1")]
    ZeroIterations,
}

// ─── Strategy Kind ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    EpsilonGreedy,
    EpsilonGreedyComplementExplore,
    EpsilonGreedyDecay,
    Softmax,
    Ucb,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::EpsilonGreedy,
        Self::EpsilonGreedyComplementExplore,
        Self::EpsilonGreedyDecay,
        Self::Softmax,
        Self::Ucb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EpsilonGreedy => "epsilon-greedy",
            Self::EpsilonGreedyComplementExplore => "epsilon-greedy-complement-explore",
            Self::EpsilonGreedyDecay => "epsilon-greedy-decay",
            Self::Softmax => "softmax",
            Self::Ucb => "ucb",
        }
    }

    /// Whether the kind enforces the min-visits exploration floor.
    pub fn has_visit_floor(&self) -> bool {
        matches!(
            self,
            Self::EpsilonGreedy | Self::EpsilonGreedyComplementExplore | Self::Ucb
        )
    }

    /// Whether selection draws against the configured `epsilon`.
    pub fn reads_epsilon(&self) -> bool {
        matches!(self, Self::EpsilonGreedy | Self::EpsilonGreedyComplementExplore)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Variant Seed ───────────────────────────────────────────────────────────

/// Configured arm: hidden success probability and reward magnitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VariantSeed {
    #[serde(deserialize_with = "lenient_f64")]
    pub ev: f64,
    #[serde(
        default = "default_reward",
        alias = "reward",
        deserialize_with = "lenient_f64"
    )]
    pub r: f64,
}

impl VariantSeed {
    pub fn new(ev: f64) -> Self {
        Self { ev, r: DEFAULT_REWARD }
    }

    pub fn with_reward(ev: f64, r: f64) -> Self {
        Self { ev, r }
    }
}

// ─── Variant State ──────────────────────────────────────────────────────────

/// Running totals for one arm. Both grow by the arm's reward magnitude.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BanditStats {
    pub pulls: f64,
    pub rewards: f64,
}

/// One arm as seen by a run: identity, oracle probability, and statistics.
///
/// `ev` is ground truth. Selection strategies only read `bandit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantState {
    pub index: usize,
    pub ev: f64,
    pub r: f64,
    pub bandit: BanditStats,
}

impl VariantState {
    pub fn from_seed(index: usize, seed: &VariantSeed) -> Self {
        Self {
            index,
            ev: seed.ev,
            r: seed.r,
            bandit: BanditStats::default(),
        }
    }

    /// Estimated success rate, `0` for an arm never pulled.
    pub fn expected_value(&self) -> f64 {
        if self.bandit.pulls == 0.0 {
            0.0
        } else {
            self.bandit.rewards / self.bandit.pulls
        }
    }
}

// ─── Candidate Configuration ────────────────────────────────────────────────

/// One competing strategy setup. Numeric fields accept JSON numbers or
/// numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    #[serde(deserialize_with = "lenient_f64")]
    pub min_visits: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub delay: u64,
    #[serde(deserialize_with = "lenient_f64")]
    pub epsilon: f64,
    #[serde(alias = "factor", deserialize_with = "lenient_f64")]
    pub decay_factor: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub tau: f64,
    #[serde(deserialize_with = "lenient_u64")]
    pub iterations: u64,
    pub variants: Vec<VariantSeed>,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            label: None,
            kind: StrategyKind::default(),
            min_visits: DEFAULT_MIN_VISITS,
            delay: DEFAULT_DELAY,
            epsilon: DEFAULT_EPSILON,
            decay_factor: DEFAULT_DECAY_FACTOR,
            tau: DEFAULT_TAU,
            iterations: DEFAULT_ITERATIONS,
            variants: vec![
                VariantSeed::new(0.2),
                VariantSeed::new(0.4),
                VariantSeed::new(0.6),
                VariantSeed::new(0.8),
            ],
        }
    }
}

impl CandidateConfig {
    pub fn new(kind: StrategyKind, variants: Vec<VariantSeed>) -> Self {
        Self {
            kind,
            variants,
            ..Self::default()
        }
    }

    /// Display name: the explicit label, else `"{position}: {kind}"`.
    pub fn display_label(&self, position: usize) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}: {}", position + 1, self.kind),
        }
    }

    /// Check every parameter the configured kind reads.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        for (index, v) in self.variants.iter().enumerate() {
            if !v.ev.is_finite() || !(0.0..=1.0).contains(&v.ev) {
                return Err(ConfigError::InvalidEv { index, value: v.ev });
            }
            if !v.r.is_finite() || v.r <= 0.0 {
                return Err(ConfigError::InvalidReward { index, value: v.r });
            }
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.min_visits.is_finite() || self.min_visits < 0.0 {
            return Err(ConfigError::InvalidMinVisits(self.min_visits));
        }
        if !self.epsilon.is_finite()
            || (self.kind.reads_epsilon() && !(0.0..=1.0).contains(&self.epsilon))
        {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if !self.decay_factor.is_finite()
            || (self.kind == StrategyKind::EpsilonGreedyDecay && self.decay_factor <= 0.0)
        {
            return Err(ConfigError::InvalidDecayFactor(self.decay_factor));
        }
        if !self.tau.is_finite() || (self.kind == StrategyKind::Softmax && self.tau <= 0.0) {
            return Err(ConfigError::InvalidTau(self.tau));
        }
        Ok(())
    }

    /// Fresh per-run arm states, indexed by position.
    pub fn initial_variants(&self) -> Vec<VariantState> {
        self.variants
            .iter()
            .enumerate()
            .map(|(i, seed)| VariantState::from_seed(i, seed))
            .collect()
    }
}

// ─── Lenient Numbers ────────────────────────────────────────────────────────

fn default_reward() -> f64 {
    DEFAULT_REWARD
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s:?}"))),
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )))
    }
}
