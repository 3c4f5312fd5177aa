//! Stage: The core enum defining every cue the machine can announce
//!
//! A Stage is NOT an animation and NOT a sound.
//! A Stage is the SEMANTIC MEANING of a moment in the round.

use serde::{Deserialize, Serialize};

/// Bonus families that can fire a `BonusTriggered` cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// All five small collectibles gathered
    Collection,
    /// Rage meter filled, free spins granted
    FreeSpins,
    /// High BAR kicker hit
    Jackpot,
}

/// Why a player action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Spin requested with nothing staked
    NoBet,
    /// Stake exceeds the balance
    NoCoins,
    /// Bet would leave no credit of slack
    NoHeadroom,
    /// Reel still moving
    SpinInProgress,
    /// Symbol cannot carry a stake
    NotBettable,
}

/// Canonical machine stage: the language spoken to presentation hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, reel about to move
    SpinStart {
        /// Spin consumed from the free-spin pool
        #[serde(default)]
        free_spin: bool,
    },

    /// Reel advanced one cell
    SpinStep {
        /// Cell now lit
        cell: u8,
        /// 1.0 = full speed, 0.0 = about to stop
        speed_ratio: f64,
    },

    /// Reel came to rest
    SpinStop {
        /// Landed cell
        cell: u8,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin paid out
    Win {
        /// Landed cell multiplier (0 for LUCK)
        multiplier: u32,
        /// Credits awarded by the spin
        #[serde(default)]
        amount: u64,
    },

    /// Win counter moved one step toward its target
    CreditTick {
        /// Value now shown on the WIN display
        shown: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // BONUS
    // ═══════════════════════════════════════════════════════════════════════
    /// A small symbol joined the collection
    CollectionItem {
        /// Symbol name (e.g. "APPLE")
        symbol: String,
    },

    /// A bonus fired
    BonusTriggered {
        bonus: BonusKind,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════
    /// One credit staked on a symbol
    BetPlaced {
        symbol: String,
    },

    /// Credits inserted
    CoinIn {
        amount: u64,
    },

    /// Player action refused
    ErrorRejected {
        reason: RejectReason,
    },
}

/// Stage grouping for filtering and routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    SpinLifecycle,
    WinLifecycle,
    Bonus,
    Input,
}

impl Stage {
    /// Get the stage category for grouping
    pub fn category(&self) -> StageCategory {
        match self {
            Stage::SpinStart { .. } | Stage::SpinStep { .. } | Stage::SpinStop { .. } => {
                StageCategory::SpinLifecycle
            }
            Stage::Win { .. } | Stage::CreditTick { .. } => StageCategory::WinLifecycle,
            Stage::CollectionItem { .. } | Stage::BonusTriggered { .. } => StageCategory::Bonus,
            Stage::BetPlaced { .. } | Stage::CoinIn { .. } | Stage::ErrorRejected { .. } => {
                StageCategory::Input
            }
        }
    }

    /// Get a simple string name for this stage type
    pub fn type_name(&self) -> &'static str {
        match self {
            Stage::SpinStart { .. } => "spin_start",
            Stage::SpinStep { .. } => "spin_step",
            Stage::SpinStop { .. } => "spin_stop",
            Stage::Win { .. } => "win",
            Stage::CreditTick { .. } => "credit_tick",
            Stage::CollectionItem { .. } => "collection_item",
            Stage::BonusTriggered { .. } => "bonus_triggered",
            Stage::BetPlaced { .. } => "bet_placed",
            Stage::CoinIn { .. } => "coin_in",
            Stage::ErrorRejected { .. } => "error_rejected",
        }
    }

    /// High-frequency cues that hosts usually throttle or skip in logs
    pub fn is_high_frequency(&self) -> bool {
        matches!(self, Stage::SpinStep { .. } | Stage::CreditTick { .. })
    }

    /// All stage type names
    pub fn all_type_names() -> &'static [&'static str] {
        &[
            "spin_start",
            "spin_step",
            "spin_stop",
            "win",
            "credit_tick",
            "collection_item",
            "bonus_triggered",
            "bet_placed",
            "coin_in",
            "error_rejected",
        ]
    }

    pub fn is_valid_type_name(name: &str) -> bool {
        Self::all_type_names().contains(&name)
    }
}
