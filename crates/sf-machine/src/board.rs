//! Board definition: the 24-cell reel ring and its weight table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Number of cells on the reel ring
pub const BOARD_SIZE: usize = 24;

/// Symbol classification of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    Bar,
    Seven,
    Star,
    Watermelon,
    Bell,
    Plum,
    Orange,
    Apple,
    /// Special symbol with its own payout rule, never staked on
    Luck,
}

impl SymbolKind {
    /// Symbols that carry a stake, in bet-panel order
    pub const BETTABLE: [SymbolKind; 8] = [
        SymbolKind::Bar,
        SymbolKind::Seven,
        SymbolKind::Star,
        SymbolKind::Watermelon,
        SymbolKind::Bell,
        SymbolKind::Plum,
        SymbolKind::Orange,
        SymbolKind::Apple,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar => "BAR",
            Self::Seven => "SEVEN",
            Self::Star => "STAR",
            Self::Watermelon => "WATERMELON",
            Self::Bell => "BELL",
            Self::Plum => "PLUM",
            Self::Orange => "ORANGE",
            Self::Apple => "APPLE",
            Self::Luck => "LUCK",
        }
    }

    /// Short label printed on the cabinet
    pub fn label(&self) -> &'static str {
        match self {
            Self::Seven => "77",
            Self::Watermelon => "MELON",
            other => other.name(),
        }
    }

    pub fn is_bettable(&self) -> bool {
        !matches!(self, Self::Luck)
    }

    /// Position in the bet ledger (None for LUCK)
    pub fn bet_slot(&self) -> Option<usize> {
        Self::BETTABLE.iter().position(|s| s == self)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SymbolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        [
            Self::Bar,
            Self::Seven,
            Self::Star,
            Self::Watermelon,
            Self::Bell,
            Self::Plum,
            Self::Orange,
            Self::Apple,
            Self::Luck,
        ]
        .into_iter()
        .find(|kind| kind.name() == upper || kind.label() == upper)
        .ok_or_else(|| ConfigError::Validation(format!("unknown symbol '{}'", s)))
    }
}

/// Position on the ring, always in 0..24
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(u8);

impl CellId {
    /// Wraps any index onto the ring
    pub const fn new(index: usize) -> Self {
        Self((index % BOARD_SIZE) as u8)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Next cell clockwise
    pub const fn next(self) -> Self {
        Self::new(self.index() + 1)
    }

    /// Cell `steps` positions counter-clockwise
    pub const fn back(self, steps: usize) -> Self {
        Self::new(self.index() + BOARD_SIZE - steps % BOARD_SIZE)
    }

    /// Clockwise distance to `target` (0 when equal)
    pub const fn distance_to(self, target: CellId) -> usize {
        (target.index() + BOARD_SIZE - self.index()) % BOARD_SIZE
    }

    /// Every cell in canonical order
    pub fn all() -> impl Iterator<Item = CellId> {
        (0..BOARD_SIZE).map(CellId::new)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02}", self.0)
    }
}

/// One fixed position on the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub symbol: SymbolKind,
    /// Stake multiplier (0 for LUCK)
    pub multiplier: u32,
    /// Small collectible variant
    pub is_small: bool,
    /// Special cell (the LUCK cells)
    pub is_special: bool,
}

impl Cell {
    const fn regular(id: usize, symbol: SymbolKind, multiplier: u32) -> Self {
        Self {
            id: CellId::new(id),
            symbol,
            multiplier,
            is_small: false,
            is_special: false,
        }
    }

    const fn small(id: usize, symbol: SymbolKind, multiplier: u32) -> Self {
        Self {
            id: CellId::new(id),
            symbol,
            multiplier,
            is_small: true,
            is_special: false,
        }
    }

    const fn luck(id: usize) -> Self {
        Self {
            id: CellId::new(id),
            symbol: SymbolKind::Luck,
            multiplier: 0,
            is_small: false,
            is_special: true,
        }
    }

    pub fn is_luck(&self) -> bool {
        self.symbol == SymbolKind::Luck
    }
}

use SymbolKind::*;

// Clockwise from the top-left corner
const LAYOUT: [Cell; BOARD_SIZE] = [
    // Top row
    Cell::regular(0, Orange, 10),
    Cell::regular(1, Bell, 20),
    Cell::small(2, Bar, 50),
    Cell::regular(3, Bar, 100),
    Cell::regular(4, Apple, 5),
    Cell::small(5, Apple, 5),
    Cell::regular(6, Plum, 20),
    // Right column
    Cell::regular(7, Watermelon, 20),
    Cell::regular(8, Watermelon, 20),
    Cell::luck(9),
    Cell::regular(10, Apple, 5),
    Cell::regular(11, Orange, 10),
    // Bottom row, right to left
    Cell::small(12, Orange, 10),
    Cell::small(13, Bell, 20),
    Cell::small(14, Seven, 20),
    Cell::regular(15, Seven, 40),
    Cell::regular(16, Apple, 5),
    Cell::small(17, Apple, 5),
    Cell::regular(18, Plum, 20),
    // Left column, bottom to top
    Cell::regular(19, Star, 20),
    Cell::regular(20, Star, 20),
    Cell::luck(21),
    Cell::regular(22, Apple, 5),
    Cell::regular(23, Plum, 10),
];

// Apples are common, BARs and 77s are rare
const WEIGHTS: [u32; BOARD_SIZE] = [
    10, 5, 2, 1, 40, 10, 8, 5, 5, 2, 40, 10, //
    5, 5, 2, 1, 40, 10, 8, 5, 5, 2, 40, 10,
];

/// Draw weight per cell, in canonical id order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: [u32; BOARD_SIZE],
}

impl WeightTable {
    /// Build a table; the weights must not all be zero
    pub fn new(weights: [u32; BOARD_SIZE]) -> Result<Self, ConfigError> {
        if weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::Validation(
                "weight table must have at least one positive weight".into(),
            ));
        }
        Ok(Self { weights })
    }

    pub fn get(&self, id: CellId) -> u32 {
        self.weights[id.index()]
    }

    pub fn total(&self) -> u32 {
        self.weights.iter().sum()
    }

    /// `(cell, weight)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (CellId, u32)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, &w)| (CellId::new(i), w))
    }

    /// Probability of drawing `id`
    pub fn probability(&self, id: CellId) -> f64 {
        self.get(id) as f64 / self.total() as f64
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self { weights: WEIGHTS }
    }
}

/// The fixed cabinet board
#[derive(Debug, Clone)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
    weights: WeightTable,
}

impl Board {
    /// The standard Super Fruit board
    pub fn standard() -> Self {
        Self {
            cells: LAYOUT,
            weights: WeightTable::default(),
        }
    }

    /// Total over all ids by construction
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// The two LUCK cells used by the losing-streak override
    pub fn relief_cells(&self) -> [CellId; 2] {
        let mut luck = self.cells.iter().filter(|c| c.is_luck()).map(|c| c.id);
        let first = luck.next().unwrap_or(CellId::new(9));
        let second = luck.next().unwrap_or(CellId::new(21));
        [first, second]
    }

    /// Distinct symbols that appear on small cells
    pub fn collectible_symbols(&self) -> Vec<SymbolKind> {
        let mut symbols: Vec<SymbolKind> = self
            .cells
            .iter()
            .filter(|c| c.is_small)
            .map(|c| c.symbol)
            .collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
