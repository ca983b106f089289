//! IO module - run configuration and result files.

mod config;

pub use config::{read_config, write_results, ObservableKind, SimulationConfig};
