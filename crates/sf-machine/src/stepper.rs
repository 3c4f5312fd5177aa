//! Spin stepper: drives the lit cell around the ring to the sampled target
//!
//! The stepper only knows about steps and delays. It does not sleep: each
//! [`ReelStepper::tick`] returns the frame for one step together with the
//! delay before the next one, and the owner schedules that tick on its
//! logical clock.

use serde::{Deserialize, Serialize};

use crate::board::{CellId, BOARD_SIZE};
use crate::error::{MachineError, MachineResult};
use crate::rng::RandomSource;
use crate::timing::ReelTiming;

/// Stepper lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepperState {
    #[default]
    Idle,
    Running,
    Landed,
}

/// Travel plan for one spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub start: CellId,
    pub target: CellId,
    /// Clockwise distance from start to target
    pub distance: u32,
    /// Full revolutions before the final approach
    pub loops: u32,
    pub total_steps: u32,
}

impl SpinPlan {
    pub fn new(start: CellId, target: CellId, loops: u32) -> Self {
        let distance = start.distance_to(target) as u32;
        Self {
            start,
            target,
            distance,
            loops,
            total_steps: BOARD_SIZE as u32 * loops + distance,
        }
    }
}

/// What a single step shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelFrame {
    /// Lit cell after the step
    pub cell: CellId,
    /// Afterimage cells, newest first (empty near the stop)
    pub trail: Vec<CellId>,
    /// 1.0 = full speed, 0.0 = stopping
    pub speed_ratio: f64,
    /// Steps done including this one
    pub step: u32,
    pub steps_remaining: u32,
    /// Delay before the next step, None on the final step
    pub delay_ms: Option<f64>,
}

impl ReelFrame {
    pub fn is_final(&self) -> bool {
        self.steps_remaining == 0
    }
}

/// Reel stepping state machine
#[derive(Debug, Clone)]
pub struct ReelStepper {
    timing: ReelTiming,
    state: StepperState,
    current: CellId,
    plan: Option<SpinPlan>,
    steps_done: u32,
}

impl ReelStepper {
    pub fn new(timing: ReelTiming) -> Self {
        Self::at(timing, CellId::default())
    }

    /// Stepper resting on `cell`
    pub fn at(timing: ReelTiming, cell: CellId) -> Self {
        Self {
            timing,
            state: StepperState::Idle,
            current: cell,
            plan: None,
            steps_done: 0,
        }
    }

    pub fn state(&self) -> StepperState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == StepperState::Idle
    }

    /// Rest position, or the lit cell while running
    pub fn current(&self) -> CellId {
        self.current
    }

    pub fn plan(&self) -> Option<&SpinPlan> {
        self.plan.as_ref()
    }

    pub fn steps_done(&self) -> u32 {
        self.steps_done
    }

    pub fn timing(&self) -> &ReelTiming {
        &self.timing
    }

    /// Swap timing; only allowed between spins
    pub fn set_timing(&mut self, timing: ReelTiming) -> MachineResult<()> {
        if !self.is_idle() {
            return Err(MachineError::SpinInProgress);
        }
        self.timing = timing;
        Ok(())
    }

    /// Start a spin toward `target`, drawing the extra revolution count
    pub fn start(&mut self, target: CellId, rng: &mut dyn RandomSource) -> MachineResult<SpinPlan> {
        if !self.is_idle() {
            return Err(MachineError::SpinInProgress);
        }
        let loops = self.timing.min_loops + rng.between(0, self.timing.max_extra_loops);
        self.start_with_loops(target, loops)
    }

    /// Start a spin with an explicit revolution count
    pub fn start_with_loops(&mut self, target: CellId, loops: u32) -> MachineResult<SpinPlan> {
        if !self.is_idle() {
            return Err(MachineError::SpinInProgress);
        }
        let plan = SpinPlan::new(self.current, target, loops);
        log::debug!(
            "Reel {} → {}: {} loops + {} = {} steps",
            plan.start,
            plan.target,
            plan.loops,
            plan.distance,
            plan.total_steps
        );

        self.plan = Some(plan);
        self.steps_done = 0;
        self.state = StepperState::Running;
        Ok(plan)
    }

    /// Advance one cell. None unless running.
    pub fn tick(&mut self) -> Option<ReelFrame> {
        if self.state != StepperState::Running {
            return None;
        }
        let total = self.plan.as_ref()?.total_steps;

        self.current = self.current.next();
        self.steps_done += 1;
        let remaining = total.saturating_sub(self.steps_done);

        let trail = if remaining > 0 && self.timing.shows_trail(remaining) {
            vec![self.current.back(1), self.current.back(2)]
        } else {
            Vec::new()
        };

        let delay_ms = (remaining > 0).then(|| self.timing.step_delay(remaining));
        if remaining == 0 {
            self.state = StepperState::Landed;
        }

        Some(ReelFrame {
            cell: self.current,
            trail,
            speed_ratio: self.timing.speed_ratio(remaining),
            step: self.steps_done,
            steps_remaining: remaining,
            delay_ms,
        })
    }

    /// Confirm the landing; the rest cell must equal the planned target
    pub fn landed_cell(&self) -> MachineResult<CellId> {
        let plan = self.plan.as_ref().ok_or(MachineError::NoSpinPlanned)?;
        if self.state != StepperState::Landed {
            return Err(MachineError::SpinInProgress);
        }
        if self.current != plan.target {
            return Err(MachineError::ReelDrift {
                expected: plan.target,
                actual: self.current,
            });
        }
        Ok(self.current)
    }

    /// Landed → Idle once the payout has been applied
    pub fn finish(&mut self) {
        if self.state == StepperState::Landed {
            self.state = StepperState::Idle;
            self.plan = None;
            self.steps_done = 0;
        }
    }

    /// Run a started spin to completion, collecting every frame
    pub fn run_to_end(&mut self) -> Vec<ReelFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.tick() {
            frames.push(frame);
        }
        frames
    }
}
