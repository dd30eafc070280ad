//! Rolling per-vault history feeding the entropy-slope and density triggers.

use std::collections::VecDeque;

/// Per-cycle samples for one vault.
#[derive(Debug, Clone)]
pub struct VaultHistory {
    entropy: VecDeque<(u64, f64)>,
    insertions: VecDeque<(u64, u64)>,
    entropy_window: usize,
    density_window_cycles: u64,
    passes: u64,
}

impl VaultHistory {
    pub fn new(entropy_window: usize, density_window_cycles: u64) -> Self {
        Self {
            entropy: VecDeque::with_capacity(entropy_window.min(4096)),
            insertions: VecDeque::new(),
            entropy_window: entropy_window.max(2),
            density_window_cycles: density_window_cycles.max(1),
            passes: 0,
        }
    }

    /// Record the closing state of `cycle`.
    pub fn record_cycle(&mut self, cycle: u64, entropy_sum: f64, inserted: u64) {
        self.entropy.push_back((cycle, entropy_sum));
        while self.entropy.len() > self.entropy_window {
            self.entropy.pop_front();
        }

        if inserted > 0 {
            self.insertions.push_back((cycle, inserted));
        }
        let floor = cycle.saturating_sub(self.density_window_cycles);
        while self.insertions.front().is_some_and(|(c, _)| *c <= floor) {
            self.insertions.pop_front();
        }
    }

    /// Entropy change across the retained window. 0 with fewer than 2 samples.
    pub fn entropy_slope(&self) -> f64 {
        match (self.entropy.front(), self.entropy.back()) {
            (Some((_, first)), Some((_, last))) if self.entropy.len() >= 2 => last - first,
            _ => 0.0,
        }
    }

    /// Scars inserted within the density window.
    pub fn recent_insertions(&self) -> u64 {
        self.insertions.iter().map(|(_, n)| n).sum()
    }

    pub fn samples(&self) -> usize {
        self.entropy.len()
    }

    /// Full maintenance passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Start a new pass and return its number (1-based).
    pub fn begin_pass(&mut self) -> u64 {
        self.passes += 1;
        self.passes
    }
}

impl Default for VaultHistory {
    fn default() -> Self {
        Self::new(
            vault_core::config::defaults::DEFAULT_ENTROPY_HISTORY_WINDOW,
            vault_core::config::defaults::DEFAULT_DENSITY_WINDOW_CYCLES,
        )
    }
}
