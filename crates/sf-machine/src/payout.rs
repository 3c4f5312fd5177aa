//! Payout engine: turns a landed cell into a win and updated progression
//!
//! Rules run in a fixed order over a copy of the progression counters:
//!
//! 1. Base: stake on the landed symbol × cell multiplier
//! 2. LUCK: random 50..=250 regardless of stake, loss streak reset
//! 3. Collection: staked small cells add their symbol to the set
//! 4. Free spins double a positive win
//! 5. Jackpot kicker on the big BAR
//! 6. Rage meter and loss streak (paid spins only)
//!
//! Crediting the win is left to the session. Awards that resolve later
//! (collection, rage) come back as [`DeferredAward`]s for the scheduler.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, CellId, SymbolKind};
use crate::config::BonusRules;
use crate::rng::RandomSource;
use crate::session::{BetLedger, Headline, Progression};

/// Award that lands after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeferredAward {
    /// Full collection set gathered
    CollectionComplete { award: u64 },
    /// Rage meter filled
    FreeSpins { spins: u32 },
}

/// Result of evaluating one landed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutOutcome {
    pub cell: CellId,
    pub symbol: SymbolKind,
    pub multiplier: u32,
    /// Stake × multiplier before amplification
    pub base_win: u64,
    /// Total credited for the spin
    pub win: u64,
    pub luck_award: Option<u64>,
    pub jackpot: Option<u64>,
    /// Symbol newly added to the collection set
    pub collected: Option<SymbolKind>,
    pub deferred: Vec<DeferredAward>,
    /// Counters after all rules ran
    pub progression: Progression,
    pub headline: Headline,
    pub big_win: bool,
    pub free_spin: bool,
}

impl PayoutOutcome {
    pub fn is_win(&self) -> bool {
        self.win > 0
    }
}

/// Evaluates landed cells against the bonus rules
#[derive(Debug, Clone, Default)]
pub struct PayoutEngine {
    rules: BonusRules,
}

impl PayoutEngine {
    pub fn new(rules: BonusRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BonusRules {
        &self.rules
    }

    /// Evaluate a landed cell
    ///
    /// `free_spin` marks a spin taken from the free-spin pool; it is fixed
    /// when the spin starts, so the last free spin still counts as one.
    pub fn evaluate(
        &self,
        cell: &Cell,
        bets: &BetLedger,
        progression: &Progression,
        free_spin: bool,
        rng: &mut dyn RandomSource,
    ) -> PayoutOutcome {
        let rules = &self.rules;
        let mut next = progression.clone();
        let mut deferred = Vec::new();
        let stake = bets.stake(cell.symbol);

        // 1. Base
        let base_win = if stake > 0 && cell.multiplier > 0 {
            (stake as u64).saturating_mul(cell.multiplier as u64)
        } else {
            0
        };
        let mut win = base_win;

        // 2. LUCK
        let mut luck_award = None;
        if cell.is_luck() {
            let units = rng.between(1, rules.luck_max_units) as u64;
            let award = rules.luck_unit.saturating_mul(units);
            win = award;
            luck_award = Some(award);
            next.consecutive_losses = 0;
        }

        // 3. Collection
        let mut collected = None;
        if cell.is_small && stake > 0 && next.collected.insert(cell.symbol) {
            collected = Some(cell.symbol);
            if next.collected.len() >= rules.collection_target {
                log::info!("Collection complete, {} credits pending", rules.collection_award);
                deferred.push(DeferredAward::CollectionComplete {
                    award: rules.collection_award,
                });
                next.collected.clear();
            }
        }

        // 4. Free-spin amplification
        if win > 0 && free_spin {
            win = win.saturating_mul(rules.free_spin_multiplier);
        }

        // 5. Jackpot kicker
        let mut jackpot = None;
        if cell.symbol == SymbolKind::Bar
            && cell.multiplier >= rules.jackpot_min_multiplier
            && win > 0
            && rng.chance(rules.jackpot_chance)
        {
            win = win.saturating_add(rules.jackpot_award);
            jackpot = Some(rules.jackpot_award);
            log::info!("Jackpot kicker hit for {}", rules.jackpot_award);
        }

        // 6. Rage and loss streak
        if !free_spin {
            if win == 0 {
                next.consecutive_losses += 1;
                let before = next.rage;
                next.rage = (next.rage + rules.rage_per_loss).min(rules.rage_cap);
                if before < rules.rage_cap && next.rage == rules.rage_cap {
                    log::info!("Rage meter full, {} free spins pending", rules.free_spins_award);
                    deferred.push(DeferredAward::FreeSpins {
                        spins: rules.free_spins_award,
                    });
                }
            } else {
                next.consecutive_losses = 0;
            }
        }

        let headline = if jackpot.is_some() {
            Headline::Jackpot
        } else if luck_award.is_some() {
            Headline::Lucky
        } else if win > rules.big_win_amount {
            Headline::BigWin
        } else if win > 0 {
            Headline::Winner
        } else {
            Headline::TryAgain
        };
        let big_win = win > 0 && (cell.multiplier >= rules.big_win_multiplier || cell.is_luck());

        PayoutOutcome {
            cell: cell.id,
            symbol: cell.symbol,
            multiplier: cell.multiplier,
            base_win,
            win,
            luck_award,
            jackpot,
            collected,
            deferred,
            progression: next,
            headline,
            big_win,
            free_spin,
        }
    }
}
