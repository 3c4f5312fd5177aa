//! Machine error types

use sf_stage::RejectReason;
use thiserror::Error;

use crate::board::{CellId, SymbolKind};

/// Machine error types
///
/// Everything except `ReelDrift` and `NoSpinPlanned` is a refused player
/// action: recoverable, and nothing in the session changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("No stake placed")]
    InsufficientBet,

    #[error("Stake of {needed} exceeds balance of {available}")]
    InsufficientCredits { needed: u64, available: u64 },

    #[error("Bet would leave no spare credit")]
    InsufficientHeadroom,

    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("{0} cannot carry a stake")]
    NotBettable(SymbolKind),

    #[error("Reel landed on {actual} instead of {expected}")]
    ReelDrift { expected: CellId, actual: CellId },

    #[error("No spin planned")]
    NoSpinPlanned,
}

impl MachineError {
    /// Cue reason for refused player actions
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::InsufficientBet => Some(RejectReason::NoBet),
            Self::InsufficientCredits { .. } => Some(RejectReason::NoCoins),
            Self::InsufficientHeadroom => Some(RejectReason::NoHeadroom),
            Self::SpinInProgress => Some(RejectReason::SpinInProgress),
            Self::NotBettable(_) => Some(RejectReason::NotBettable),
            Self::ReelDrift { .. } | Self::NoSpinPlanned => None,
        }
    }
}

pub type MachineResult<T> = Result<T, MachineError>;
