//! Random source: the single seam every draw goes through
//!
//! Outcome sampling, the extra reel loop, the LUCK payout and the jackpot
//! kicker all pull from a [`RandomSource`], so a seeded or scripted source
//! makes a whole session reproducible.

use rand::prelude::*;

/// Source of uniform draws
pub trait RandomSource {
    /// Uniform integer in `0..bound` (`bound` > 0)
    fn below(&mut self, bound: u32) -> u32;

    /// `true` with the given probability
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform integer in `low..=high`
    fn between(&mut self, low: u32, high: u32) -> u32 {
        debug_assert!(low <= high);
        low + self.below(high - low + 1)
    }
}

/// Pseudo-random source backed by `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Reproducible source
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        self.rng.random_range(0..bound)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn below(&mut self, bound: u32) -> u32 {
        (**self).below(bound)
    }

    fn chance(&mut self, probability: f64) -> bool {
        (**self).chance(probability)
    }
}

/// Source that replays a fixed script of draws
///
/// `below` pops the next integer (clamped into range), `chance` pops the
/// next flag. An exhausted script answers 0 / `false`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: std::collections::VecDeque<u32>,
    flags: std::collections::VecDeque<bool>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue integer draws
    pub fn with_values(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.values.extend(values);
        self
    }

    /// Queue probability outcomes
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = bool>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn remaining(&self) -> usize {
        self.values.len() + self.flags.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: u32) -> u32 {
        let value = self.values.pop_front().unwrap_or(0);
        value.min(bound.saturating_sub(1))
    }

    fn chance(&mut self, _probability: f64) -> bool {
        self.flags.pop_front().unwrap_or(false)
    }
}
