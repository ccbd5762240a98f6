// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Run Metrics
//
// Reduces a finished run's ledgers into fixed-width display series, and
// summarizes scalar samples across repeats.

use serde::{Deserialize, Serialize};

use crate::simulation::RunLedger;
use crate::types::VariantSeed;

/// Display width of every metric series.
pub const DATA_POINTS: usize = 100;

// ─── Metric Kinds ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    CumulativeReward,
    CumulativeRegret,
    BestArmUsage,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [
        Self::CumulativeReward,
        Self::CumulativeRegret,
        Self::BestArmUsage,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::CumulativeReward => "Cumulative Reward",
            Self::CumulativeRegret => "Cumulative Regret",
            Self::BestArmUsage => "Best Arm Usage",
        }
    }
}

// ─── Run Metrics ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetrics {
    pub cumulative_reward: Vec<f64>,
    pub cumulative_regret: Vec<f64>,
    pub best_arm_usage: Vec<f64>,
}

impl RunMetrics {
    /// Reduce a completed run against the candidate's seed arms.
    pub fn from_ledger(ledger: &RunLedger, seeds: &[VariantSeed]) -> Self {
        let best = best_index(seeds);

        let rewards: Vec<f64> = ledger.reward_events.iter().map(|&e| f64::from(e)).collect();
        let misses: Vec<f64> = ledger
            .chosen_indexes
            .iter()
            .map(|&i| if Some(i) == best { 0.0 } else { 1.0 })
            .collect();

        let mut hits = 0usize;
        let usage: Vec<f64> = ledger
            .chosen_indexes
            .iter()
            .enumerate()
            .map(|(step, &i)| {
                if Some(i) == best {
                    hits += 1;
                }
                hits as f64 / (step + 1) as f64
            })
            .collect();

        Self {
            cumulative_reward: downsample(&cumulative_sum(&rewards), DATA_POINTS),
            cumulative_regret: downsample(&cumulative_sum(&misses), DATA_POINTS),
            best_arm_usage: downsample(&usage, DATA_POINTS),
        }
    }

    pub fn series(&self, metric: MetricKind) -> &[f64] {
        match metric {
            MetricKind::CumulativeReward => &self.cumulative_reward,
            MetricKind::CumulativeRegret => &self.cumulative_regret,
            MetricKind::BestArmUsage => &self.best_arm_usage,
        }
    }

    pub fn series_mut(&mut self, metric: MetricKind) -> &mut Vec<f64> {
        match metric {
            MetricKind::CumulativeReward => &mut self.cumulative_reward,
            MetricKind::CumulativeRegret => &mut self.cumulative_regret,
            MetricKind::BestArmUsage => &mut self.best_arm_usage,
        }
    }

    /// Last value of a series, `0` when empty.
    pub fn final_value(&self, metric: MetricKind) -> f64 {
        self.series(metric).last().copied().unwrap_or(0.0)
    }
}

// ─── Series Helpers ─────────────────────────────────────────────────────────

/// Oracle best arm: highest `ev`, earliest on ties.
pub fn best_index(seeds: &[VariantSeed]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, seed) in seeds.iter().enumerate() {
        match best {
            Some((_, top)) if seed.ev <= top => {}
            _ => best = Some((i, seed.ev)),
        }
    }
    best.map(|(i, _)| i)
}

pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Compress `series` to at most `points` samples.
///
/// The series is split into `min(points, len)` contiguous buckets; bucket `k`
/// ends at index `(k + 1) * len / buckets - 1`. Each bucket contributes its
/// last element, so the final sample is always the final source value.
pub fn downsample(series: &[f64], points: usize) -> Vec<f64> {
    let len = series.len();
    let buckets = points.min(len);
    (0..buckets)
        .map(|k| series[(k + 1) * len / buckets - 1])
        .collect()
}

// ─── Statistics (per-metric aggregation across repeats) ─────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::default();
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(evs: &[f64]) -> Vec<VariantSeed> {
        evs.iter().map(|&ev| VariantSeed::new(ev)).collect()
    }

    #[test]
    fn test_best_index_first_tie() {
        assert_eq!(best_index(&seeds(&[0.1, 0.9, 0.3, 0.9])), Some(1));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn test_cumulative_sum() {
        assert_eq!(cumulative_sum(&[1.0, 0.0, 1.0, 1.0]), vec![1.0, 1.0, 2.0, 3.0]);
        assert!(cumulative_sum(&[]).is_empty());
    }

    #[test]
    fn test_downsample_even_buckets_take_last() {
        let series: Vec<f64> = (1..=1000u32).map(f64::from).collect();
        let out = downsample(&series, DATA_POINTS);
        assert_eq!(out.len(), 100);
        assert_eq!(out[0], 10.0);
        assert_eq!(out[1], 20.0);
        assert_eq!(out[99], 1000.0);
    }

    #[test]
    fn test_downsample_uneven_length() {
        let series: Vec<f64> = (1..=1050u32).map(f64::from).collect();
        let out = downsample(&series, DATA_POINTS);
        assert_eq!(out.len(), 100);
        assert_eq!(out[0], 10.0);
        assert_eq!(out[99], 1050.0);
    }

    #[test]
    fn test_downsample_short_series_keeps_all() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(downsample(&series, DATA_POINTS), series);
        assert!(downsample(&[], DATA_POINTS).is_empty());
    }

    #[test]
    fn test_run_metrics_from_ledger() {
        // Best arm is 1; steps pick 0, 1, 1, 0.
        let ledger = RunLedger {
            chosen_indexes: vec![0, 1, 1, 0],
            reward_events: vec![0, 1, 1, 0],
        };
        let m = RunMetrics::from_ledger(&ledger, &seeds(&[0.2, 0.8]));
        assert_eq!(m.cumulative_reward, vec![0.0, 1.0, 2.0, 2.0]);
        assert_eq!(m.cumulative_regret, vec![1.0, 1.0, 1.0, 2.0]);
        assert_eq!(m.best_arm_usage, vec![0.0, 0.5, 2.0 / 3.0, 0.5]);
        assert_eq!(m.final_value(MetricKind::CumulativeRegret), 2.0);
    }

    #[test]
    fn test_stats_single_sample() {
        let s = Stats::from_samples(&[4.0]);
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.ci_lower, 4.0);
        assert_eq!(s.n, 1);
    }

    #[test]
    fn test_stats_spread() {
        let s = Stats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s.mean - 2.5).abs() < f64::EPSILON);
        assert!(s.ci_lower < s.mean && s.mean < s.ci_upper);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }
}
