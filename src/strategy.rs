// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Selection Strategies
//
// Pure per-step policies. A strategy reads the arms' running statistics and
// returns the arm to pull; all mutation happens afterwards in the run loop.
// The hidden `ev` of an arm is never consulted here.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::sampler::{normalize, sample_weighted};
use crate::types::{CandidateConfig, StrategyKind, VariantState};

// ─── Strategy ───────────────────────────────────────────────────────────────

/// A selection policy with its parameters, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionStrategy {
    EpsilonGreedy { epsilon: f64, min_visits: f64 },
    ComplementExplore { epsilon: f64, min_visits: f64 },
    EpsilonGreedyDecay { decay_factor: f64 },
    Softmax { tau: f64 },
    Ucb { min_visits: f64 },
}

impl SelectionStrategy {
    pub fn from_config(config: &CandidateConfig) -> Self {
        match config.kind {
            StrategyKind::EpsilonGreedy => Self::EpsilonGreedy {
                epsilon: config.epsilon,
                min_visits: config.min_visits,
            },
            StrategyKind::EpsilonGreedyComplementExplore => Self::ComplementExplore {
                epsilon: config.epsilon,
                min_visits: config.min_visits,
            },
            StrategyKind::EpsilonGreedyDecay => Self::EpsilonGreedyDecay {
                decay_factor: config.decay_factor,
            },
            StrategyKind::Softmax => Self::Softmax { tau: config.tau },
            StrategyKind::Ucb => Self::Ucb {
                min_visits: config.min_visits,
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::EpsilonGreedy { .. } => StrategyKind::EpsilonGreedy,
            Self::ComplementExplore { .. } => StrategyKind::EpsilonGreedyComplementExplore,
            Self::EpsilonGreedyDecay { .. } => StrategyKind::EpsilonGreedyDecay,
            Self::Softmax { .. } => StrategyKind::Softmax,
            Self::Ucb { .. } => StrategyKind::Ucb,
        }
    }

    /// Choose the arm to pull this step. `None` only when `variants` is empty.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        variants: &'a [VariantState],
        rng: &mut R,
    ) -> Option<&'a VariantState> {
        match *self {
            Self::EpsilonGreedy { epsilon, min_visits } => {
                if let Some(v) = choose_under_visited(variants, min_visits, rng) {
                    return Some(v);
                }
                if explore_gate(variants, epsilon, rng) {
                    return variants.choose(rng);
                }
                best_expected_value(variants)
            }
            Self::ComplementExplore { epsilon, min_visits } => {
                if let Some(v) = choose_under_visited(variants, min_visits, rng) {
                    return Some(v);
                }
                if explore_gate(variants, epsilon, rng) {
                    return choose_complement(variants, rng);
                }
                best_expected_value(variants)
            }
            Self::EpsilonGreedyDecay { decay_factor } => {
                let u: f64 = rng.gen();
                if u < effective_epsilon(decay_factor, variants) {
                    return variants.choose(rng);
                }
                best_expected_value(variants)
            }
            Self::Softmax { tau } => {
                let weights = softmax_weights(variants, tau);
                let i = sample_weighted(&weights, rng)?;
                variants.get(i)
            }
            Self::Ucb { min_visits } => {
                // A never-pulled arm has no confidence bound; treat it as
                // under-visited whatever min_visits says.
                let starved: Vec<&VariantState> = variants
                    .iter()
                    .filter(|v| v.bandit.pulls < min_visits || v.bandit.pulls == 0.0)
                    .collect();
                if let Some(v) = starved.choose(rng) {
                    return Some(*v);
                }
                let total = total_pulls(variants);
                argmax_first(variants, |v| ucb_score(v, total))
            }
        }
    }
}

// ─── Shared Pieces ──────────────────────────────────────────────────────────

/// Exploration probability for the decay strategy:
/// `K * factor / (total_rewards + K * factor)`.
pub fn effective_epsilon(decay_factor: f64, variants: &[VariantState]) -> f64 {
    let scaled = variants.len() as f64 * decay_factor;
    scaled / (total_rewards(variants) + scaled)
}

/// Boltzmann probabilities `exp(EV / tau)`, normalized.
///
/// Exponents are shifted by the largest EV first; the normalized result is
/// the same and small `tau` cannot overflow.
pub fn softmax_weights(variants: &[VariantState], tau: f64) -> Vec<f64> {
    let max_ev = variants
        .iter()
        .map(VariantState::expected_value)
        .fold(f64::NEG_INFINITY, f64::max);
    let scores: Vec<f64> = variants
        .iter()
        .map(|v| ((v.expected_value() - max_ev) / tau).exp())
        .collect();
    normalize(&scores).unwrap_or_else(|| uniform_weights(variants.len()))
}

/// Exploration weights favouring less-pulled arms:
/// `(total_pulls - pulls(i))`, normalized. Uniform when every complement is
/// zero (single arm, or nothing pulled yet).
pub fn complement_weights(variants: &[VariantState]) -> Vec<f64> {
    let total = total_pulls(variants);
    let complements: Vec<f64> = variants.iter().map(|v| total - v.bandit.pulls).collect();
    normalize(&complements).unwrap_or_else(|| uniform_weights(variants.len()))
}

pub fn total_pulls(variants: &[VariantState]) -> f64 {
    variants.iter().map(|v| v.bandit.pulls).sum()
}

pub fn total_rewards(variants: &[VariantState]) -> f64 {
    variants.iter().map(|v| v.bandit.rewards).sum()
}

fn uniform_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

fn choose_under_visited<'a, R: Rng + ?Sized>(
    variants: &'a [VariantState],
    min_visits: f64,
    rng: &mut R,
) -> Option<&'a VariantState> {
    let below: Vec<&VariantState> = variants
        .iter()
        .filter(|v| v.bandit.pulls < min_visits)
        .collect();
    below.choose(rng).copied()
}

/// Draw `u`; explore when `u < epsilon` or no arm has earned anything yet.
fn explore_gate<R: Rng + ?Sized>(variants: &[VariantState], epsilon: f64, rng: &mut R) -> bool {
    let u: f64 = rng.gen();
    let any_rewarded = variants.iter().any(|v| v.bandit.rewards != 0.0);
    u < epsilon || !any_rewarded
}

fn choose_complement<'a, R: Rng + ?Sized>(
    variants: &'a [VariantState],
    rng: &mut R,
) -> Option<&'a VariantState> {
    let weights = complement_weights(variants);
    let i = sample_weighted(&weights, rng)?;
    variants.get(i)
}

fn best_expected_value(variants: &[VariantState]) -> Option<&VariantState> {
    argmax_first(variants, VariantState::expected_value)
}

fn ucb_score(v: &VariantState, total_pulls: f64) -> f64 {
    // ln of a sub-unit total (fractional rewards) would go negative.
    let log_total = total_pulls.ln().max(0.0);
    v.expected_value() + (2.0 * log_total / v.bandit.pulls).sqrt()
}

/// Highest score wins; ties go to the earliest arm.
fn argmax_first<F>(variants: &[VariantState], score: F) -> Option<&VariantState>
where
    F: Fn(&VariantState) -> f64,
{
    let mut best: Option<(&VariantState, f64)> = None;
    for v in variants {
        let s = score(v);
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((v, s)),
        }
    }
    best.map(|(v, _)| v)
}
