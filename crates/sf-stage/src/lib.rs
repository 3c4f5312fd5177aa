//! # sf-stage: Super Fruit Cue System
//!
//! Defines the canonical stages the machine core announces while it runs.
//! Hosts (audio, lighting, loggers) never look at engine internals, only at
//! STAGES.
//!
//! ## Philosophy
//!
//! Every round passes through the same semantic moments:
//! - Spin starts → Reel steps → Reel stops → Win / bonus cues
//!
//! This crate defines those moments, the sink interface that receives them
//! and a trace recorder for replay and inspection.

pub mod event;
pub mod sink;
pub mod stage;
pub mod trace;

pub use event::*;
pub use sink::*;
pub use stage::*;
pub use trace::*;
