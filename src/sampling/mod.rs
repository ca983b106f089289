//! Sampling module - Monte Carlo driver and time-series statistics.

pub mod stats;
mod vmc;

pub use vmc::{MCMCParams, MCMCSimulation};
