//! Outcome sampler: weighted draw over the board with a losing-streak override

use crate::board::{CellId, WeightTable};
use crate::rng::RandomSource;

/// Weighted outcome selection
#[derive(Debug, Clone)]
pub struct OutcomeSampler {
    /// Consecutive losses at which the override kicks in
    pity_threshold: u32,
    /// Cells returned by the override, each with probability ½
    relief_cells: [CellId; 2],
}

impl OutcomeSampler {
    pub fn new(pity_threshold: u32, relief_cells: [CellId; 2]) -> Self {
        Self {
            pity_threshold,
            relief_cells,
        }
    }

    pub fn pity_threshold(&self) -> u32 {
        self.pity_threshold
    }

    /// Is the losing-streak override active for this loss count
    pub fn is_pity(&self, consecutive_losses: u32) -> bool {
        consecutive_losses >= self.pity_threshold
    }

    /// Draw the target cell for the next spin
    pub fn sample(
        &self,
        weights: &WeightTable,
        consecutive_losses: u32,
        rng: &mut dyn RandomSource,
    ) -> CellId {
        if self.is_pity(consecutive_losses) {
            let pick = self.relief_cells[rng.below(2) as usize];
            log::debug!(
                "Losing streak of {} forces relief cell {}",
                consecutive_losses,
                pick
            );
            return pick;
        }

        let r = rng.below(weights.total());
        select(weights, r)
    }
}

/// Cumulative-weight selection for a draw `r` in `0..total`
///
/// Walks cells in canonical order; zero-weight cells are never returned.
/// `r` past the end clamps to the last positive-weight cell.
pub fn select(weights: &WeightTable, r: u32) -> CellId {
    let mut remaining = r;
    let mut last_positive = None;

    for (id, weight) in weights.iter() {
        if weight == 0 {
            continue;
        }
        if remaining < weight {
            return id;
        }
        remaining -= weight;
        last_positive = Some(id);
    }

    last_positive.unwrap_or_default()
}
