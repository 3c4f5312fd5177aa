//! Win counter: the WIN display rolling toward the credited amount

use serde::{Deserialize, Serialize};

/// Displayed win, stepped toward its target in shrinking increments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCounter {
    shown: u64,
    target: u64,
    divisor: u64,
}

impl WinCounter {
    pub fn new(divisor: u64) -> Self {
        Self {
            shown: 0,
            target: 0,
            divisor: divisor.max(1),
        }
    }

    pub fn shown(&self) -> u64 {
        self.shown
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.shown == self.target
    }

    /// Point the counter at a new amount; `shown` keeps its value
    pub fn set_target(&mut self, target: u64) {
        self.target = target;
    }

    /// Blank the display for a new spin
    pub fn reset(&mut self) {
        self.shown = 0;
        self.target = 0;
    }

    /// One counter step; `None` once settled
    ///
    /// Climbs by `ceil(remaining / divisor)`, snaps straight down when the
    /// display is above the target.
    pub fn tick(&mut self) -> Option<u64> {
        if self.shown == self.target {
            return None;
        }
        if self.shown > self.target {
            self.shown = self.target;
        } else {
            self.shown += (self.target - self.shown).div_ceil(self.divisor);
        }
        Some(self.shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolls_up_in_shrinking_steps() {
        let mut counter = WinCounter::new(10);
        counter.set_target(100);

        let mut seen = Vec::new();
        while let Some(shown) = counter.tick() {
            seen.push(shown);
        }
        assert_eq!(&seen[..3], &[10, 19, 28]);
        assert_eq!(*seen.last().unwrap(), 100);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!(counter.is_settled());
    }

    #[test]
    fn test_small_target_is_one_step() {
        let mut counter = WinCounter::new(10);
        counter.set_target(5);
        assert_eq!(counter.tick(), Some(1));
        assert_eq!(counter.tick(), Some(2));
    }

    #[test]
    fn test_snaps_down() {
        let mut counter = WinCounter::new(10);
        counter.set_target(40);
        while counter.tick().is_some() {}
        counter.set_target(0);

        assert_eq!(counter.tick(), Some(0));
        assert_eq!(counter.tick(), None);
    }
}
