// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Simulation Core

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delay_queue::{DelayedRewardQueue, DelayedTask};
use crate::strategy::SelectionStrategy;
use crate::types::{CandidateConfig, ConfigError, VariantState};

// ─── Run Ledger ─────────────────────────────────────────────────────────────

/// Raw event record of one run.
///
/// `chosen_indexes` has one entry per step. `reward_events` records credit
/// resolutions in the order they happen: failures immediately, successes
/// when their delayed credit is drained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLedger {
    pub chosen_indexes: Vec<usize>,
    pub reward_events: Vec<u8>,
}

impl RunLedger {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            chosen_indexes: Vec::with_capacity(steps),
            reward_events: Vec::with_capacity(steps),
        }
    }

    pub fn total_credits(&self) -> usize {
        self.reward_events.iter().filter(|&&e| e == 1).count()
    }
}

/// Ledger entries reserved up front; longer runs grow on demand.
const MAX_PREALLOCATED_STEPS: u64 = 1 << 20;

fn preallocated_steps(iterations: u64) -> usize {
    usize::try_from(iterations.min(MAX_PREALLOCATED_STEPS)).unwrap_or(0)
}

// ─── Run State ──────────────────────────────────────────────────────────────

/// Everything a run mutates, owned by exactly one [`SimulationRun`].
#[derive(Debug, Clone)]
pub struct RunState {
    pub variants: Vec<VariantState>,
    pub queue: DelayedRewardQueue,
    pub ledger: RunLedger,
    pub step: u64,
}

impl RunState {
    pub fn new(config: &CandidateConfig) -> Self {
        Self {
            variants: config.initial_variants(),
            queue: DelayedRewardQueue::new(),
            ledger: RunLedger::with_capacity(preallocated_steps(config.iterations)),
            step: 0,
        }
    }
}

// ─── Simulation Run ─────────────────────────────────────────────────────────

/// One full trial of `iterations` steps for one candidate.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    strategy: SelectionStrategy,
    iterations: u64,
    delay: u64,
    state: RunState,
}

impl SimulationRun {
    /// Build a run from a candidate config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the candidate fails validation.
    pub fn new(config: &CandidateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            strategy: SelectionStrategy::from_config(config),
            iterations: config.iterations,
            delay: config.delay,
            state: RunState::new(config),
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.step >= self.iterations
    }

    /// Advance one step: select, record, pull, resolve, drain.
    ///
    /// A finished run is left untouched.
    pub fn step_core<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_finished() {
            return;
        }
        let step = self.state.step;

        let Some(chosen) = self
            .strategy
            .select(&self.state.variants, rng)
            .map(|v| v.index)
        else {
            return;
        };
        self.state.ledger.chosen_indexes.push(chosen);

        let variant = &mut self.state.variants[chosen];
        variant.bandit.pulls += variant.r;

        let u: f64 = rng.gen();
        if u <= variant.ev {
            self.state.queue.schedule(DelayedTask {
                target_step: step.saturating_add(self.delay),
                variant: chosen,
            });
        } else {
            self.state.ledger.reward_events.push(0);
        }

        self.state.queue.drain(
            step,
            self.iterations,
            &mut self.state.variants,
            &mut self.state.ledger.reward_events,
        );
        self.state.step += 1;
    }

    /// Run every remaining step and hand back the final state.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> RunState {
        while !self.is_finished() {
            self.step_core(rng);
        }
        debug!(
            strategy = %self.strategy.kind(),
            steps = self.state.step,
            credits = self.state.ledger.total_credits(),
            "run complete"
        );
        self.state
    }
}

/// Validate `config` and run it to completion with a ChaCha8 stream seeded
/// from `seed`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the candidate fails validation.
pub fn run_seeded(config: &CandidateConfig, seed: u64) -> Result<RunState, ConfigError> {
    let run = SimulationRun::new(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok(run.run(&mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StrategyKind, VariantSeed};

    fn candidate(kind: StrategyKind, delay: u64, iterations: u64) -> CandidateConfig {
        let mut cfg = CandidateConfig::new(
            kind,
            vec![
                VariantSeed::new(0.1),
                VariantSeed::new(0.3),
                VariantSeed::new(0.7),
                VariantSeed::new(0.9),
            ],
        );
        cfg.delay = delay;
        cfg.iterations = iterations;
        cfg
    }

    #[test]
    fn test_huge_horizon_reserves_bounded_ledger() {
        let state = RunState::new(&candidate(StrategyKind::Ucb, 0, u64::MAX));
        assert!(state.ledger.chosen_indexes.is_empty());
        assert!(state.ledger.chosen_indexes.capacity() >= MAX_PREALLOCATED_STEPS as usize);
        assert_eq!(preallocated_steps(u64::MAX), MAX_PREALLOCATED_STEPS as usize);
        assert_eq!(preallocated_steps(20), 20);
    }

    #[test]
    fn test_one_choice_per_step() {
        let state = run_seeded(&candidate(StrategyKind::EpsilonGreedy, 10, 500), 1).unwrap();
        assert_eq!(state.ledger.chosen_indexes.len(), 500);
        assert_eq!(state.step, 500);
    }

    #[test]
    fn test_zero_delay_ledger_matches_steps() {
        let state = run_seeded(&candidate(StrategyKind::Softmax, 0, 300), 3).unwrap();
        assert_eq!(state.ledger.reward_events.len(), 300);
        assert!(state.queue.is_empty());
    }

    #[test]
    fn test_horizon_flush_loses_no_credit() {
        let cfg = candidate(StrategyKind::EpsilonGreedy, 15, 20);
        for seed in 0..20 {
            let state = run_seeded(&cfg, seed).unwrap();
            assert!(state.queue.is_empty(), "seed {seed}: credit left pending");
            assert_eq!(state.ledger.chosen_indexes.len(), 20);
            // Every step resolves exactly once, as a failure or a credit.
            assert_eq!(state.ledger.reward_events.len(), 20);

            let credited: f64 = state.variants.iter().map(|v| v.bandit.rewards).sum();
            assert!((credited - state.ledger.total_credits() as f64).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_delay_reorders_resolution_events() {
        // Every pull succeeds; with delay 5 and horizon 20 the first five
        // steps resolve nothing yet.
        let mut cfg = CandidateConfig::new(StrategyKind::EpsilonGreedy, vec![VariantSeed::new(1.0)]);
        cfg.delay = 5;
        cfg.iterations = 20;
        let mut run = SimulationRun::new(&cfg).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..5 {
            run.step_core(&mut rng);
        }
        assert!(run.state().ledger.reward_events.is_empty());
        assert_eq!(run.state().queue.len(), 5);

        run.step_core(&mut rng);
        assert_eq!(run.state().ledger.reward_events, vec![1]);

        // Step 15 schedules target 20 == horizon: flushed on the same step.
        for _ in 6..=15 {
            run.step_core(&mut rng);
        }
        assert_eq!(run.state().queue.len(), 4);
        let state = run.run(&mut rng);
        assert_eq!(state.ledger.reward_events, vec![1; 20]);
    }

    #[test]
    fn test_rewards_never_exceed_pulls_each_step() {
        for kind in StrategyKind::ALL {
            let mut cfg = candidate(kind, 7, 400);
            cfg.variants[1].r = 2.5;
            let mut run = SimulationRun::new(&cfg).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(11);
            while !run.is_finished() {
                run.step_core(&mut rng);
                for v in &run.state().variants {
                    assert!(v.bandit.rewards <= v.bandit.pulls, "{kind}: {v:?}");
                }
            }
        }
    }

    #[test]
    fn test_pulls_accumulate_by_reward_magnitude() {
        let mut cfg = CandidateConfig::new(StrategyKind::Ucb, vec![VariantSeed::with_reward(0.0, 4.0)]);
        cfg.iterations = 10;
        cfg.delay = 0;
        let state = run_seeded(&cfg, 0).unwrap();
        assert!((state.variants[0].bandit.pulls - 40.0).abs() < f64::EPSILON);
        assert_eq!(state.variants[0].bandit.rewards, 0.0);
        assert_eq!(state.ledger.reward_events, vec![0; 10]);
    }

    #[test]
    fn test_same_seed_same_run() {
        let cfg = candidate(StrategyKind::EpsilonGreedyComplementExplore, 3, 250);
        let a = run_seeded(&cfg, 99).unwrap();
        let b = run_seeded(&cfg, 99).unwrap();
        assert_eq!(a.ledger, b.ledger);
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let cfg = CandidateConfig::new(StrategyKind::EpsilonGreedy, vec![]);
        assert_eq!(run_seeded(&cfg, 0).unwrap_err(), ConfigError::NoVariants);
    }

    #[test]
    fn test_step_after_finish_is_noop() {
        let cfg = candidate(StrategyKind::Softmax, 0, 2);
        let mut run = SimulationRun::new(&cfg).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..5 {
            run.step_core(&mut rng);
        }
        assert_eq!(run.state().ledger.chosen_indexes.len(), 2);
    }
}
