//! StageEvent: A stage occurrence with metadata
//!
//! Wraps a Stage with the logical timestamp and payload the host needs.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event with full metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Logical timestamp in milliseconds since the machine was created
    pub timestamp_ms: f64,

    /// Additional payload data
    #[serde(default)]
    pub payload: StagePayload,

    /// Custom tags for filtering/routing
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StageEvent {
    pub fn new(stage: Stage, timestamp_ms: f64) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload: StagePayload::default(),
            tags: Vec::new(),
        }
    }

    /// Create with payload
    pub fn with_payload(stage: Stage, timestamp_ms: f64, payload: StagePayload) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload,
            tags: Vec::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

/// Additional payload data for a stage event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePayload {
    // ═══ ROUND DATA ═══
    /// Spin sequence number within the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin_id: Option<u64>,

    /// Credits after the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,

    /// Total stake of the round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_amount: Option<u64>,

    // ═══ REEL DATA ═══
    /// Trail cells behind the lit cell
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trail: Vec<u8>,

    /// Delay until the next reel step (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,

    // ═══ BONUS DATA ═══
    /// Free spins left after the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spins_remaining: Option<u32>,

    /// Credits granted by a bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award: Option<u64>,
}

impl StagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set spin id
    pub fn spin_id(mut self, id: u64) -> Self {
        self.spin_id = Some(id);
        self
    }

    /// Builder: set balance
    pub fn balance(mut self, credits: u64) -> Self {
        self.balance = Some(credits);
        self
    }

    /// Builder: set bet amount
    pub fn bet_amount(mut self, amount: u64) -> Self {
        self.bet_amount = Some(amount);
        self
    }

    /// Builder: set trail
    pub fn trail(mut self, cells: impl Into<Vec<u8>>) -> Self {
        self.trail = cells.into();
        self
    }

    /// Builder: set delay to next step
    pub fn delay_ms(mut self, delay: f64) -> Self {
        self.delay_ms = Some(delay);
        self
    }

    /// Builder: set spins remaining
    pub fn spins_remaining(mut self, spins: u32) -> Self {
        self.spins_remaining = Some(spins);
        self
    }

    /// Builder: set bonus award
    pub fn award(mut self, credits: u64) -> Self {
        self.award = Some(credits);
        self
    }
}
