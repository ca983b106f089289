//! Lattice module - geometry consumed by the sampler.

mod traits;
mod periodic;

pub use traits::Lattice;
pub use periodic::{PeriodicLattice, LatticeShape};
