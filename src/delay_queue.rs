// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bandit Arena - Delayed Reward Queue
//
// A success is decided at selection time but credited to the arm only once
// its target step is reached. Credits whose target lies at or beyond the run
// horizon are flushed on the very next drain, so nothing is left pending when
// the run ends.

use crate::types::VariantState;

/// An outstanding obligation to credit `variant` with its reward magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedTask {
    pub target_step: u64,
    pub variant: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DelayedRewardQueue {
    pending: Vec<DelayedTask>,
}

impl DelayedRewardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: DelayedTask) {
        self.pending.push(task);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[DelayedTask] {
        &self.pending
    }

    /// Execute every task that is due at `step` or can never come due before
    /// `horizon`, in insertion order. Each execution adds the arm's `r` to its
    /// rewards and appends `1` to `reward_events`.
    ///
    /// Returns the number of credits applied.
    pub fn drain(
        &mut self,
        step: u64,
        horizon: u64,
        variants: &mut [VariantState],
        reward_events: &mut Vec<u8>,
    ) -> usize {
        let before = self.pending.len();
        self.pending.retain(|task| {
            if step < task.target_step && task.target_step < horizon {
                return true;
            }
            if let Some(v) = variants.get_mut(task.variant) {
                v.bandit.rewards += v.r;
                reward_events.push(1);
            }
            false
        });
        before - self.pending.len()
    }
}
