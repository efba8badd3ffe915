//! Courier Simulation Library
//!
//! The real-time core of a delivery game: a generated city, collision,
//! traffic agents and the delivery order lifecycle, runnable headless.

pub mod simulation;
