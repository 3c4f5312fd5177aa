//! Session state: credits, bets, progression counters and running stats

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sf_stage::RejectReason;

use crate::board::{CellId, SymbolKind};
use crate::error::{MachineError, MachineResult};
use crate::payout::PayoutOutcome;

// ═══════════════════════════════════════════════════════════════════════════════
// BETS
// ═══════════════════════════════════════════════════════════════════════════════

/// Stake per bettable symbol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLedger {
    stakes: [u32; SymbolKind::BETTABLE.len()],
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stake on `symbol` (always 0 for LUCK)
    pub fn stake(&self, symbol: SymbolKind) -> u32 {
        symbol.bet_slot().map_or(0, |slot| self.stakes[slot])
    }

    /// Add one credit of stake on `symbol`
    pub fn add(&mut self, symbol: SymbolKind) -> MachineResult<u32> {
        let slot = symbol.bet_slot().ok_or(MachineError::NotBettable(symbol))?;
        self.stakes[slot] += 1;
        Ok(self.stakes[slot])
    }

    pub fn clear(&mut self) {
        self.stakes = Default::default();
    }

    pub fn total(&self) -> u64 {
        self.stakes.iter().map(|&s| s as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `(symbol, stake)` in bet-panel order
    pub fn iter(&self) -> impl Iterator<Item = (SymbolKind, u32)> + '_ {
        SymbolKind::BETTABLE
            .iter()
            .copied()
            .zip(self.stakes.iter().copied())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Counters the payout rules read and rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    /// 0..=rage_cap
    pub rage: u32,
    pub free_spins_remaining: u32,
    pub consecutive_losses: u32,
    /// Distinct small symbols collected so far
    pub collected: BTreeSet<SymbolKind>,
}

impl Progression {
    pub fn in_free_spins(&self) -> bool {
        self.free_spins_remaining > 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEADLINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Text on the cabinet message display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Headline {
    #[default]
    InsertCoin,
    CoinIn,
    Spinning,
    FreeSpin { remaining: u32 },
    TryAgain,
    Winner,
    BigWin,
    Lucky,
    Jackpot,
    CollectionBonus { award: u64 },
    FreeSpinsAwarded { spins: u32 },
    Rejected { reason: RejectReason },
}

impl fmt::Display for Headline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertCoin => f.write_str("INSERT COIN"),
            Self::CoinIn => f.write_str("COIN IN"),
            Self::Spinning => f.write_str("SPINNING..."),
            Self::FreeSpin { remaining } => write!(f, "FREE SPIN ({} LEFT)", remaining),
            Self::TryAgain => f.write_str("TRY AGAIN"),
            Self::Winner => f.write_str("WINNER!"),
            Self::BigWin => f.write_str("BIG WIN!!"),
            Self::Lucky => f.write_str("LUCKY BONUS!"),
            Self::Jackpot => f.write_str("JACKPOT!!!"),
            Self::CollectionBonus { award } => write!(f, "COLLECTION BONUS +{}", award),
            Self::FreeSpinsAwarded { spins } => write!(f, "RAGE! {} FREE SPINS", spins),
            Self::Rejected { reason } => f.write_str(match reason {
                RejectReason::NoBet => "PLACE BET",
                RejectReason::NoCoins => "NO COINS",
                RejectReason::NoHeadroom => "NO CREDIT",
                RejectReason::SpinInProgress => "SPINNING...",
                RejectReason::NotBettable => "NO BET ON LUCK",
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub free_spins_played: u64,
    pub total_wagered: u64,
    /// Spin wins plus bonus awards
    pub total_won: u64,
    pub wins: u64,
    pub losses: u64,
    pub luck_hits: u64,
    pub jackpots: u64,
    pub collection_bonuses: u64,
    pub free_spin_bonuses: u64,
    pub coins_inserted: u64,
    pub max_win: u64,
}

impl SessionStats {
    /// Return to player, in percent of credits wagered
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_won as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Percent of spins that paid something
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// How a spin was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinCharge {
    /// Consumed from the free-spin pool
    Free,
    /// Credits deducted up front
    Paid(u64),
}

impl SpinCharge {
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Authoritative session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub credits: u64,
    pub bets: BetLedger,
    pub progression: Progression,
    /// Reel rest position, carried between spins
    pub current_cell: CellId,
    /// Win the display counter is heading to
    pub target_win: u64,
    pub headline: Headline,
    /// Presentation hint for high-multiplier or LUCK wins
    pub big_win: bool,
    pub stats: SessionStats,
}

impl SessionState {
    pub fn new(starting_credits: u64) -> Self {
        Self {
            credits: starting_credits,
            bets: BetLedger::new(),
            progression: Progression::default(),
            current_cell: CellId::default(),
            target_win: 0,
            headline: Headline::InsertCoin,
            big_win: false,
            stats: SessionStats::default(),
        }
    }

    pub fn total_bet(&self) -> u64 {
        self.bets.total()
    }

    /// Validate a spin request without touching anything
    pub fn check_spin(&self) -> MachineResult<SpinCharge> {
        if self.progression.in_free_spins() {
            return Ok(SpinCharge::Free);
        }
        let total = self.total_bet();
        if total == 0 {
            return Err(MachineError::InsufficientBet);
        }
        if total > self.credits {
            return Err(MachineError::InsufficientCredits {
                needed: total,
                available: self.credits,
            });
        }
        Ok(SpinCharge::Paid(total))
    }

    /// Charge for a spin: consume a free spin or deduct the stake
    pub fn begin_spin(&mut self) -> MachineResult<SpinCharge> {
        let charge = self.check_spin()?;
        match charge {
            SpinCharge::Free => {
                self.progression.free_spins_remaining -= 1;
                self.stats.free_spins_played += 1;
                self.headline = Headline::FreeSpin {
                    remaining: self.progression.free_spins_remaining,
                };
            }
            SpinCharge::Paid(stake) => {
                self.credits -= stake;
                self.stats.total_wagered += stake;
                self.headline = Headline::Spinning;
            }
        }
        self.stats.total_spins += 1;
        self.target_win = 0;
        self.big_win = false;
        Ok(charge)
    }

    /// Stake one more credit on `symbol`
    ///
    /// Needs at least one credit of slack beyond the current total stake.
    pub fn place_bet(&mut self, symbol: SymbolKind) -> MachineResult<u32> {
        if !symbol.is_bettable() {
            return Err(MachineError::NotBettable(symbol));
        }
        if self.credits <= self.total_bet() {
            return Err(MachineError::InsufficientHeadroom);
        }
        self.bets.add(symbol)
    }

    pub fn clear_bets(&mut self) {
        self.bets.clear();
    }

    /// Credit a coin-in; the balance saturates instead of wrapping
    pub fn add_credits(&mut self, amount: u64) {
        self.credits = self.credits.saturating_add(amount);
        self.stats.coins_inserted = self.stats.coins_inserted.saturating_add(amount);
        self.headline = Headline::CoinIn;
    }

    /// Apply an evaluated spin
    pub fn apply_payout(&mut self, outcome: &PayoutOutcome) {
        self.progression = outcome.progression.clone();
        self.current_cell = outcome.cell;
        self.credits = self.credits.saturating_add(outcome.win);
        self.target_win = outcome.win;
        self.headline = outcome.headline;
        self.big_win = outcome.big_win;

        self.stats.total_won = self.stats.total_won.saturating_add(outcome.win);
        self.stats.max_win = self.stats.max_win.max(outcome.win);
        if outcome.win > 0 {
            self.stats.wins += 1;
        } else {
            self.stats.losses += 1;
        }
        if outcome.luck_award.is_some() {
            self.stats.luck_hits += 1;
        }
        if outcome.jackpot.is_some() {
            self.stats.jackpots += 1;
        }
    }

    /// Deferred collection award lands
    pub fn award_collection(&mut self, award: u64) {
        self.credits = self.credits.saturating_add(award);
        self.stats.total_won = self.stats.total_won.saturating_add(award);
        self.stats.collection_bonuses += 1;
        self.headline = Headline::CollectionBonus { award };
    }

    /// Deferred rage bonus lands
    pub fn grant_free_spins(&mut self, spins: u32) {
        self.progression.free_spins_remaining =
            self.progression.free_spins_remaining.saturating_add(spins);
        self.progression.rage = 0;
        self.stats.free_spin_bonuses += 1;
        self.headline = Headline::FreeSpinsAwarded { spins };
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(100)
    }
}
