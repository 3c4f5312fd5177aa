//! Timing profiles for the reel and the win counter

use serde::{Deserialize, Serialize};

use crate::board::BOARD_SIZE;
use crate::config::ConfigError;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Cabinet speed
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Custom scaled timing
    Custom,
}

/// Reel stepping schedule
///
/// Step counts never depend on the profile; only delays scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelTiming {
    pub profile: TimingProfile,

    /// Delay between steps at full speed (ms)
    pub start_delay_ms: f64,

    /// Delay before the final step (ms)
    pub end_delay_ms: f64,

    /// Full revolutions always completed before landing
    pub min_loops: u32,

    /// Random extra revolutions, drawn from `0..=max_extra_loops`
    pub max_extra_loops: u32,

    /// Steps over which the reel decelerates
    pub decel_window: u32,

    /// Trail is hidden once fewer steps than this remain
    pub trail_cutoff: u32,

    /// Delay between landing and the collection award (ms)
    pub collection_bonus_delay_ms: f64,

    /// Delay between landing and the free-spin grant (ms)
    pub rage_bonus_delay_ms: f64,
}

impl ReelTiming {
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            start_delay_ms: 30.0,
            end_delay_ms: 600.0,
            min_loops: 3,
            max_extra_loops: 1,
            decel_window: 20,
            trail_cutoff: 5,
            collection_bonus_delay_ms: 1500.0,
            rage_bonus_delay_ms: 1000.0,
        }
    }

    /// Fast mode: half the delays, same travel
    pub fn turbo() -> Self {
        Self::normal().accelerated()
    }

    /// Turbo variant of this schedule; travel and windows are kept
    pub fn accelerated(&self) -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..self.scaled(0.5)
        }
    }

    /// Scale every delay by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            start_delay_ms: self.start_delay_ms * factor,
            end_delay_ms: self.end_delay_ms * factor,
            collection_bonus_delay_ms: self.collection_bonus_delay_ms * factor,
            rage_bonus_delay_ms: self.rage_bonus_delay_ms * factor,
            ..self.clone()
        }
    }

    /// Deceleration progress in `[0,1]`, or None while at full speed
    pub fn ease_progress(&self, steps_remaining: u32) -> Option<f64> {
        if steps_remaining >= self.decel_window {
            return None;
        }
        let window = self.decel_window as f64;
        Some((window - steps_remaining as f64) / window)
    }

    /// Delay before the next step, quadratic ease-out over the last window
    pub fn step_delay(&self, steps_remaining: u32) -> f64 {
        match self.ease_progress(steps_remaining) {
            None => self.start_delay_ms,
            Some(t) => self.start_delay_ms + (self.end_delay_ms - self.start_delay_ms) * t * t,
        }
    }

    /// 1.0 at full speed, falling linearly to 0.0 across the window
    pub fn speed_ratio(&self, steps_remaining: u32) -> f64 {
        self.ease_progress(steps_remaining).map_or(1.0, |t| 1.0 - t)
    }

    pub fn shows_trail(&self, steps_remaining: u32) -> bool {
        steps_remaining >= self.trail_cutoff
    }

    /// Shortest possible spin in steps
    pub fn min_total_steps(&self) -> u32 {
        BOARD_SIZE as u32 * self.min_loops
    }

    /// Logical time from the first to the last step of a spin
    pub fn spin_duration_ms(&self, total_steps: u32) -> f64 {
        (1..total_steps)
            .map(|done| self.step_delay(total_steps - done))
            .sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.start_delay_ms >= 0.0 && self.start_delay_ms.is_finite()) {
            return Err(ConfigError::Validation("start_delay_ms must be >= 0".into()));
        }
        if !(self.end_delay_ms >= self.start_delay_ms && self.end_delay_ms.is_finite()) {
            return Err(ConfigError::Validation(
                "end_delay_ms must be >= start_delay_ms".into(),
            ));
        }
        if self.min_loops == 0 || self.min_loops > 20 {
            return Err(ConfigError::Validation("min_loops must be in 1..=20".into()));
        }
        if self.max_extra_loops > 10 {
            return Err(ConfigError::Validation("max_extra_loops must be <= 10".into()));
        }
        if self.decel_window == 0 || self.decel_window > self.min_total_steps() {
            return Err(ConfigError::Validation(
                "decel_window must be in 1..=min_loops*24".into(),
            ));
        }
        if self.trail_cutoff > self.decel_window {
            return Err(ConfigError::Validation(
                "trail_cutoff must not exceed decel_window".into(),
            ));
        }
        if self.collection_bonus_delay_ms < 0.0 || self.rage_bonus_delay_ms < 0.0 {
            return Err(ConfigError::Validation("bonus delays must be >= 0".into()));
        }
        Ok(())
    }
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self::normal()
    }
}

/// Win display counter cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterTiming {
    /// Interval between counter steps (ms)
    pub tick_ms: f64,
    /// Each step covers `ceil(remaining / divisor)`
    pub divisor: u64,
}

impl CounterTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_ms > 0.0 && self.tick_ms.is_finite()) {
            return Err(ConfigError::Validation("counter tick_ms must be > 0".into()));
        }
        if self.divisor == 0 {
            return Err(ConfigError::Validation("counter divisor must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for CounterTiming {
    fn default() -> Self {
        Self {
            tick_ms: 50.0,
            divisor: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plateau_then_ease_out() {
        let timing = ReelTiming::normal();

        for remaining in 20..100 {
            assert_eq!(timing.step_delay(remaining), 30.0);
            assert_eq!(timing.speed_ratio(remaining), 1.0);
        }

        // t = 0.5 → 30 + 570 * 0.25
        assert_relative_eq!(timing.step_delay(10), 172.5);
        assert_relative_eq!(timing.speed_ratio(10), 0.5);
        assert_relative_eq!(timing.step_delay(0), 600.0);
        assert_relative_eq!(timing.speed_ratio(0), 0.0);
    }

    #[test]
    fn test_delay_monotonic_in_window() {
        let timing = ReelTiming::normal();
        let mut prev = timing.step_delay(20);
        for remaining in (0..20).rev() {
            let delay = timing.step_delay(remaining);
            assert!(delay >= prev, "delay fell at remaining={}", remaining);
            prev = delay;
        }
    }

    #[test]
    fn test_trail_cutoff() {
        let timing = ReelTiming::normal();
        assert!(timing.shows_trail(5));
        assert!(!timing.shows_trail(4));
        assert!(!timing.shows_trail(0));
    }

    #[test]
    fn test_turbo_keeps_travel() {
        let normal = ReelTiming::normal();
        let turbo = ReelTiming::turbo();

        assert_eq!(turbo.profile, TimingProfile::Turbo);
        assert_eq!(turbo.min_total_steps(), normal.min_total_steps());
        assert!(turbo.spin_duration_ms(80) < normal.spin_duration_ms(80));
        assert!(turbo.validate().is_ok());
    }

    #[test]
    fn test_accelerated_keeps_custom_fields() {
        let mut timing = ReelTiming::normal();
        timing.decel_window = 12;
        timing.collection_bonus_delay_ms = 3000.0;

        let fast = timing.accelerated();
        assert_eq!(fast.profile, TimingProfile::Turbo);
        assert_eq!(fast.decel_window, 12);
        assert_relative_eq!(fast.collection_bonus_delay_ms, 1500.0);
        assert_relative_eq!(fast.start_delay_ms, 15.0);
        assert!(fast.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut timing = ReelTiming::normal();
        timing.end_delay_ms = 10.0;
        assert!(timing.validate().is_err());

        let mut timing = ReelTiming::normal();
        timing.trail_cutoff = 30;
        assert!(timing.validate().is_err());

        assert!(CounterTiming { tick_ms: 0.0, divisor: 10 }.validate().is_err());
    }
}
