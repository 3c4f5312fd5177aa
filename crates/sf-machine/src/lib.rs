//! # sf-machine: Super Fruit Machine Core
//!
//! A single-reel fruit machine: 24 cells around a ring, one lit cell that
//! runs a few laps and eases to a stop on a weighted-random target, eight
//! bettable symbols and a handful of progression bonuses.
//!
//! ## Features
//!
//! - **Weighted Sampler**: integer weight table with a losing-streak override
//! - **Reel Stepper**: lap-then-ease-out stepping with trail and speed ratio
//! - **Payout Rules**: base pays, LUCK, collection set, free spins, rage, jackpot
//! - **Logical Clock**: every delayed effect is a task in one ordered queue
//! - **Cues**: every moment is announced as an `sf_stage::Stage`
//!
//! ## Architecture
//!
//! ```text
//! Machine
//!     │
//!     ├── Board + WeightTable (fixed 24-cell ring)
//!     ├── OutcomeSampler ──── RandomSource (seeded / scripted)
//!     ├── ReelStepper (ReelTiming)
//!     ├── PayoutEngine (BonusRules)
//!     ├── SessionState (credits, bets, progression, stats)
//!     └── Scheduler (reel steps, deferred awards, counter ticks)
//!           │
//!           v
//!     CueSink (StageEvent) + PresentationSink (ReelFrame, SessionSnapshot)
//! ```

pub mod board;
pub mod config;
pub mod counter;
pub mod error;
pub mod machine;
pub mod payout;
pub mod presentation;
pub mod rng;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod stepper;
pub mod timing;

pub use board::*;
pub use config::*;
pub use counter::*;
pub use error::*;
pub use machine::*;
pub use payout::*;
pub use presentation::*;
pub use rng::*;
pub use sampler::*;
pub use scheduler::*;
pub use session::*;
pub use stepper::*;
pub use timing::*;
