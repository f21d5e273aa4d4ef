//! Skirmish - Real-Time Battle Simulation Engine

pub mod core;
pub mod engine;
pub mod scenario;
pub mod snapshot;
pub mod targeting;
