//! Presentation seam: what a display host sees of the machine
//!
//! The machine pushes reel frames, landings and full session snapshots into
//! a [`PresentationSink`]. Hosts render from these alone and never reach
//! into the session.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::board::{CellId, SymbolKind};
use crate::session::{Headline, SessionStats};
use crate::stepper::ReelFrame;

/// Everything a cabinet display needs, copied out after each mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Logical clock (ms)
    pub time_ms: f64,
    pub spin_id: u64,
    pub credits: u64,
    /// Value on the WIN display
    pub win_shown: u64,
    pub target_win: u64,
    pub headline: Headline,
    /// Rendered headline text
    pub message: String,
    pub big_win: bool,
    pub spinning: bool,
    /// Lit cell (rest position when idle)
    pub active_cell: CellId,
    pub trail: Vec<CellId>,
    pub rage: u32,
    pub free_spins_remaining: u32,
    pub consecutive_losses: u32,
    pub collected: Vec<SymbolKind>,
    /// Stake per bettable symbol, in bet-panel order
    pub bets: Vec<(SymbolKind, u32)>,
    pub total_bet: u64,
    pub stats: SessionStats,
}

/// Display host hooks; every method defaults to a no-op
pub trait PresentationSink {
    /// One reel step
    fn on_frame(&mut self, _frame: &ReelFrame) {}

    /// Reel came to rest
    fn on_landed(&mut self, _cell: CellId) {}

    /// Session changed
    fn on_snapshot(&mut self, _snapshot: &SessionSnapshot) {}
}

/// What a [`RecordingPresentation`] has seen
#[derive(Debug, Clone, Default)]
pub struct PresentationLog {
    pub frames: Vec<ReelFrame>,
    pub landed: Vec<CellId>,
    pub snapshots: Vec<SessionSnapshot>,
}

/// Presentation sink recording into a buffer shared between clones
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    log: Arc<Mutex<PresentationLog>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<ReelFrame> {
        self.log.lock().frames.clone()
    }

    pub fn landed(&self) -> Vec<CellId> {
        self.log.lock().landed.clone()
    }

    pub fn last_snapshot(&self) -> Option<SessionSnapshot> {
        self.log.lock().snapshots.last().cloned()
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> PresentationLog {
        std::mem::take(&mut *self.log.lock())
    }
}

impl PresentationSink for RecordingPresentation {
    fn on_frame(&mut self, frame: &ReelFrame) {
        self.log.lock().frames.push(frame.clone());
    }

    fn on_landed(&mut self, cell: CellId) {
        self.log.lock().landed.push(cell);
    }

    fn on_snapshot(&mut self, snapshot: &SessionSnapshot) {
        self.log.lock().snapshots.push(snapshot.clone());
    }
}
