#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Runtime engine and session host for the Savings Arcade.
//!
//! [`RuntimeEngine`] owns a single run: the world, the spawning and weapons
//! systems, and the snapshot throttle. Each call to [`RuntimeEngine::tick`]
//! runs the fixed frame pipeline (clock, spawns, steering, smart bomb,
//! firing, motion, hazards, projectile hits, power-ups, score and terminal
//! checks) and then verifies the frame's invariants. [`Arcade`] wraps the
//! engine with calibration, input and best-score persistence.

mod arcade;
mod engine;
mod snapshot;
mod tuning;

pub use arcade::Arcade;
pub use engine::{RunSummary, RuntimeEngine};
pub use snapshot::SnapshotThrottle;
pub use tuning::{Tuning, TuningError};
