//! Cue sinks: fire-and-forget receivers of stage events
//!
//! The machine core pushes every cue through a [`CueSink`]. A sink may fail
//! (device gone, buffer full); the caller logs the failure and carries on.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::event::StageEvent;

/// Cue delivery failure
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    #[error("Sink rejected {stage}: {reason}")]
    Rejected { stage: &'static str, reason: String },
}

/// Receiver of stage cues (audio, lights, loggers)
pub trait CueSink {
    fn cue(&mut self, event: &StageEvent) -> Result<(), SinkError>;
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CueSink for NullSink {
    fn cue(&mut self, _event: &StageEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that writes cues to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl CueSink for LogSink {
    fn cue(&mut self, event: &StageEvent) -> Result<(), SinkError> {
        if event.stage.is_high_frequency() {
            log::trace!("[{:>9.1}ms] {:?}", event.timestamp_ms, event.stage);
        } else {
            log::debug!("[{:>9.1}ms] {:?}", event.timestamp_ms, event.stage);
        }
        Ok(())
    }
}

/// Recording sink sharing its buffer with the host
///
/// Clones share the same buffer, so a host can hand one clone to the
/// machine and read cues back through another.
#[derive(Debug, Default, Clone)]
pub struct SharedRecorder {
    events: Arc<Mutex<Vec<StageEvent>>>,
}

impl SharedRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every recorded event
    pub fn events(&self) -> Vec<StageEvent> {
        self.events.lock().clone()
    }

    /// Take recorded events, leaving the buffer empty
    pub fn drain(&self) -> Vec<StageEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Count events with the given type name
    pub fn count(&self, type_name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.type_name() == type_name)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl CueSink for SharedRecorder {
    fn cue(&mut self, event: &StageEvent) -> Result<(), SinkError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
