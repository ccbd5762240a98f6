//! Property tests for run invariants, sampling, and downsampling.

use bandit_arena::metrics::{cumulative_sum, downsample};
use bandit_arena::sampler::index_by_random;
use bandit_arena::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn kind_strategy() -> impl Strategy<Value = StrategyKind> {
    prop::sample::select(StrategyKind::ALL.to_vec())
}

fn variants_strategy() -> impl Strategy<Value = Vec<VariantSeed>> {
    prop::collection::vec(
        (0.0f64..=1.0, prop::sample::select(vec![0.5, 1.0, 2.0, 10.0]))
            .prop_map(|(ev, r)| VariantSeed::with_reward(ev, r)),
        1..6,
    )
}

proptest! {
    /// Rewards never outrun pulls, step by step, for any strategy.
    #[test]
    fn rewards_bounded_by_pulls(
        kind in kind_strategy(),
        variants in variants_strategy(),
        delay in 0u64..30,
        min_visits in 0.0f64..15.0,
        iterations in 1u64..300,
        seed in any::<u64>(),
    ) {
        let cfg = CandidateConfig {
            delay,
            min_visits,
            iterations,
            ..CandidateConfig::new(kind, variants)
        };
        let mut run = SimulationRun::new(&cfg).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        while !run.is_finished() {
            run.step_core(&mut rng);
            for v in &run.state().variants {
                prop_assert!(v.bandit.rewards <= v.bandit.pulls);
            }
        }
        let state = run.state();
        prop_assert_eq!(state.ledger.chosen_indexes.len() as u64, iterations);
        prop_assert!(state.queue.is_empty());
        prop_assert_eq!(state.ledger.reward_events.len() as u64, iterations);
    }

    /// While any arm is below min visits, floor-bearing kinds stay inside
    /// the under-visited set.
    #[test]
    fn floor_selects_under_visited(
        kind in prop::sample::select(vec![
            StrategyKind::EpsilonGreedy,
            StrategyKind::EpsilonGreedyComplementExplore,
            StrategyKind::Ucb,
        ]),
        variants in variants_strategy(),
        min_visits in 1.0f64..20.0,
        seed in any::<u64>(),
    ) {
        let cfg = CandidateConfig {
            min_visits,
            iterations: 200,
            ..CandidateConfig::new(kind, variants)
        };
        let mut run = SimulationRun::new(&cfg).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        while !run.is_finished() {
            let below: Vec<usize> = run
                .state()
                .variants
                .iter()
                .filter(|v| v.bandit.pulls < min_visits)
                .map(|v| v.index)
                .collect();
            run.step_core(&mut rng);
            let chosen = *run.state().ledger.chosen_indexes.last().unwrap();
            if !below.is_empty() {
                prop_assert!(below.contains(&chosen), "chose {} outside {:?}", chosen, below);
            }
        }
    }

    /// Downsampling a monotone series keeps it monotone and keeps its end.
    #[test]
    fn downsample_monotone(steps in prop::collection::vec(0.0f64..5.0, 1..3000)) {
        let series = cumulative_sum(&steps);
        let out = downsample(&series, DATA_POINTS);
        prop_assert_eq!(out.len(), DATA_POINTS.min(series.len()));
        for w in out.windows(2) {
            prop_assert!(w[0] <= w[1]);
        }
        prop_assert_eq!(out.last(), series.last());
    }

    /// The sampler always lands in range.
    #[test]
    fn sampler_in_range(
        raw in prop::collection::vec(0.0f64..1.0, 1..20),
        r in 0.0f64..1.0,
    ) {
        let total: f64 = raw.iter().sum();
        prop_assume!(total > 0.0);
        let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
        let i = index_by_random(&weights, r).unwrap();
        prop_assert!(i < weights.len());
    }
}
