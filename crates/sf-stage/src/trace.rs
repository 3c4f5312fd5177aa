//! StageTrace: A recorded sequence of stage events for a session
//!
//! A trace captures the full cue timeline so a round can be replayed,
//! inspected or exported as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::sink::{CueSink, SinkError};
use crate::stage::{BonusKind, Stage};

/// A complete trace of stage events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Machine identifier (e.g., "super_fruit")
    pub machine_id: String,

    /// All events in emission order
    pub events: Vec<StageEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl StageTrace {
    pub fn new(trace_id: impl Into<String>, machine_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            machine_id: machine_id.into(),
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Build a trace from already recorded events
    pub fn from_events(
        trace_id: impl Into<String>,
        machine_id: impl Into<String>,
        events: Vec<StageEvent>,
    ) -> Self {
        let mut trace = Self::new(trace_id, machine_id);
        trace.events = events;
        trace
    }

    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        let first = self.events.first().map(|e| e.timestamp_ms).unwrap_or(0.0);
        let last = self.events.last().map(|e| e.timestamp_ms).unwrap_or(0.0);
        last - first
    }

    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    /// Sum of all `Win` amounts
    pub fn total_win(&self) -> u64 {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::Win { amount, .. } => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Bonuses fired, in order
    pub fn bonuses(&self) -> Vec<BonusKind> {
        self.events
            .iter()
            .filter_map(|e| match e.stage {
                Stage::BonusTriggered { bonus } => Some(bonus),
                _ => None,
            })
            .collect()
    }

    /// Validate the spin lifecycle ordering of the trace
    pub fn validate(&self) -> TraceValidation {
        let mut validation = TraceValidation {
            spin_starts: self.events_by_type("spin_start").len(),
            spin_stops: self.events_by_type("spin_stop").len(),
            ordered_timestamps: true,
            steps_outside_spin: 0,
        };

        let mut in_spin = false;
        let mut prev_ts = f64::NEG_INFINITY;
        for event in &self.events {
            if event.timestamp_ms < prev_ts {
                validation.ordered_timestamps = false;
            }
            prev_ts = event.timestamp_ms;

            match event.stage {
                Stage::SpinStart { .. } => in_spin = true,
                Stage::SpinStop { .. } => in_spin = false,
                Stage::SpinStep { .. } if !in_spin => validation.steps_outside_spin += 1,
                _ => {}
            }
        }

        validation
    }

    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            machine_id: self.machine_id.clone(),
            event_count: self.events.len(),
            duration_ms: self.duration_ms(),
            spins: self.events_by_type("spin_stop").len(),
            total_win: self.total_win(),
            bonuses: self.bonuses().len(),
        }
    }
}

impl CueSink for StageTrace {
    fn cue(&mut self, event: &StageEvent) -> Result<(), SinkError> {
        self.push(event.clone());
        Ok(())
    }
}

/// Validation result for a trace
#[derive(Debug, Clone, Default)]
pub struct TraceValidation {
    pub spin_starts: usize,
    pub spin_stops: usize,
    pub ordered_timestamps: bool,
    pub steps_outside_spin: usize,
}

impl TraceValidation {
    pub fn is_valid(&self) -> bool {
        self.ordered_timestamps
            && self.steps_outside_spin == 0
            // The last spin may still be running when the trace is taken
            && (self.spin_starts == self.spin_stops || self.spin_starts == self.spin_stops + 1)
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if !self.ordered_timestamps {
            warnings.push("Timestamps go backwards");
        }
        if self.steps_outside_spin > 0 {
            warnings.push("SPIN_STEP outside a spin");
        }
        if self.spin_starts > self.spin_stops + 1 || self.spin_stops > self.spin_starts {
            warnings.push("SPIN_START / SPIN_STOP mismatch");
        }

        warnings
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub machine_id: String,
    pub event_count: usize,
    pub duration_ms: f64,
    pub spins: usize,
    pub total_win: u64,
    pub bonuses: usize,
}
