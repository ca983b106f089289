//! Hubbard VMC - Variational Monte Carlo for the Hubbard model in Rust
//!
//! This crate samples Slater-Jastrow wavefunctions on periodic lattices with
//! the Metropolis algorithm. The determinant ratios and Jastrow factors
//! needed for every proposed hop are read off incrementally maintained
//! matrices W and T, which are periodically rebuilt to bound numerical drift.

pub mod error;
pub mod lattice;
pub mod correlation;
pub mod wavefunction;
pub mod systems;
pub mod observables;
pub mod sampling;
pub mod io;

// Re-export commonly used types at crate root
pub use error::{Result, VmcError};
pub use lattice::{Lattice, LatticeShape, PeriodicLattice};
pub use correlation::Jastrow;
pub use wavefunction::{free_fermion_energy, tight_binding_orbitals};
pub use systems::{ElectronConfiguration, ElectronHop, HubbardModelVmc, HubbardParams, SiteOccupation};
pub use observables::{Estimate, MCCResults, Observable, ObservableEnergy, ObservableSpinSpinCorrelation};
pub use sampling::{MCMCParams, MCMCSimulation};
pub use io::{read_config, write_results, SimulationConfig};
