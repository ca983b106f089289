//! Wavefunction module - Slater determinant building blocks.

mod slater;
mod orbitals;

pub use slater::{slater_matrix, invert_slater};
pub use orbitals::{hopping_matrix, tight_binding_orbitals, free_fermion_energy};
