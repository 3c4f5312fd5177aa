//! Machine configuration
//!
//! Everything tunable lives here. The board itself (symbols, multipliers,
//! weights) is fixed; only the timing and bonus constants move.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timing::{CounterTiming, ReelTiming};

/// Configuration loading / validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Payout and progression constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusRules {
    /// Consecutive losses that force a LUCK cell
    pub pity_threshold: u32,

    /// Rage gained per losing paid spin
    pub rage_per_loss: u32,
    /// Rage level that grants free spins
    pub rage_cap: u32,
    /// Free spins granted when rage fills
    pub free_spins_award: u32,
    /// Win multiplier applied during free spins
    pub free_spin_multiplier: u64,

    /// LUCK pays `luck_unit * random(1..=luck_max_units)`
    pub luck_unit: u64,
    pub luck_max_units: u32,

    /// Distinct small symbols needed for the collection award
    pub collection_target: usize,
    pub collection_award: u64,

    /// BAR multiplier that arms the jackpot kicker
    pub jackpot_min_multiplier: u32,
    pub jackpot_chance: f64,
    pub jackpot_award: u64,

    /// Wins above this read "BIG WIN"
    pub big_win_amount: u64,
    /// Landed multiplier that flags a big-win presentation
    pub big_win_multiplier: u32,
}

impl Default for BonusRules {
    fn default() -> Self {
        Self {
            pity_threshold: 10,
            rage_per_loss: 5,
            rage_cap: 100,
            free_spins_award: 5,
            free_spin_multiplier: 2,
            luck_unit: 50,
            luck_max_units: 5,
            collection_target: 5,
            collection_award: 500,
            jackpot_min_multiplier: 100,
            jackpot_chance: 0.10,
            jackpot_award: 5000,
            big_win_amount: 50,
            big_win_multiplier: 20,
        }
    }
}

impl BonusRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pity_threshold == 0 {
            return Err(ConfigError::Validation("pity_threshold must be > 0".into()));
        }
        if self.rage_per_loss == 0 || self.rage_cap == 0 || self.rage_per_loss > self.rage_cap {
            return Err(ConfigError::Validation(
                "rage_per_loss must be in 1..=rage_cap".into(),
            ));
        }
        if self.free_spin_multiplier == 0 {
            return Err(ConfigError::Validation(
                "free_spin_multiplier must be > 0".into(),
            ));
        }
        if self.luck_unit == 0 || self.luck_max_units == 0 {
            return Err(ConfigError::Validation("LUCK payout must be positive".into()));
        }
        if self.luck_unit.checked_mul(self.luck_max_units as u64).is_none() {
            return Err(ConfigError::Validation("LUCK payout overflows".into()));
        }
        // Only five distinct small symbols exist on the board
        if !(1..=5).contains(&self.collection_target) {
            return Err(ConfigError::Validation(
                "collection_target must be in 1..=5".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jackpot_chance) {
            return Err(ConfigError::Validation(
                "jackpot_chance must be in 0..=1".into(),
            ));
        }
        Ok(())
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Credits at power-on
    pub starting_credits: u64,
    /// Credits added by one coin
    pub coin_value: u64,
    /// RNG seed; None seeds from the OS
    pub seed: Option<u64>,
    pub timing: ReelTiming,
    pub counter: CounterTiming,
    pub rules: BonusRules,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            starting_credits: 100,
            coin_value: 10,
            seed: None,
            timing: ReelTiming::normal(),
            counter: CounterTiming::default(),
            rules: BonusRules::default(),
        }
    }
}

impl MachineConfig {
    /// Default rules with turbo timing
    pub fn turbo() -> Self {
        Self {
            timing: ReelTiming::turbo(),
            ..Self::default()
        }
    }

    /// Builder: fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let config = match ext.as_deref() {
            Some("json") => Self::from_json_str(&text)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text)?,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "unsupported config extension: {}",
                    path.display()
                )));
            }
        };

        log::info!("Loaded machine config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coin_value == 0 {
            return Err(ConfigError::Validation("coin_value must be > 0".into()));
        }
        self.timing.validate()?;
        self.counter.validate()?;
        self.rules.validate()?;
        Ok(())
    }
}
