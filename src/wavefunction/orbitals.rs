//! Tight-binding single-particle orbitals.
//!
//! Builds the orbital matrix M of a Slater determinant from the eigenvectors
//! of the hopping Hamiltonian H[i][j] = -t[X-1] for sites j in shell X of i.
//! Spin-up electrons occupy the lowest states in the upper block of M,
//! spin-down electrons the lowest states in the lower block.

use nalgebra::{DMatrix, DVector};
use crate::error::{Result, VmcError};
use crate::lattice::Lattice;

/// Single-particle hopping Hamiltonian on the spin-up sites.
pub fn hopping_matrix<L: Lattice>(lattice: &L, t: &[f64]) -> DMatrix<f64> {
    let l = lattice.num_sites();
    let mut h = DMatrix::zeros(l, l);
    for i in 0..l {
        for (x, &t_x) in t.iter().enumerate() {
            for &j in lattice.xnn(i, x + 1) {
                h[(i, j)] -= t_x;
            }
        }
    }
    h
}

/// Eigenvalues in ascending order with the matching eigenvectors as columns.
fn sorted_eigen(h: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eig = h.symmetric_eigen();
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

    let values = DVector::from_iterator(order.len(), order.iter().map(|&i| eig.eigenvalues[i]));
    let vectors = eig.eigenvectors.select_columns(order.iter());
    (values, vectors)
}

fn check_filling(l: usize, n_up: usize, n_down: usize) -> Result<()> {
    if n_up > l || n_down > l {
        return Err(VmcError::InvalidParameter(format!(
            "cannot place {} up and {} down electrons on {} sites",
            n_up, n_down, l
        )));
    }
    Ok(())
}

fn warn_open_shell(energies: &DVector<f64>, filled: usize, spin: &str) {
    if filled > 0 && filled < energies.len() && (energies[filled] - energies[filled - 1]).abs() < 1e-10 {
        log::warn!(
            "open shell for spin-{} electrons: level {} at energy {} is degenerate with the first empty level",
            spin,
            filled - 1,
            energies[filled - 1]
        );
    }
}

/// Orbital matrix M (2L × N) of the free-fermion ground state.
pub fn tight_binding_orbitals<L: Lattice>(
    lattice: &L,
    t: &[f64],
    n_up: usize,
    n_down: usize,
) -> Result<DMatrix<f64>> {
    let l = lattice.num_sites();
    check_filling(l, n_up, n_down)?;

    let (energies, states) = sorted_eigen(hopping_matrix(lattice, t));
    warn_open_shell(&energies, n_up, "up");
    warn_open_shell(&energies, n_down, "down");

    let mut m = DMatrix::zeros(2 * l, n_up + n_down);
    m.view_mut((0, 0), (l, n_up)).copy_from(&states.columns(0, n_up));
    m.view_mut((l, n_up), (l, n_down)).copy_from(&states.columns(0, n_down));
    Ok(m)
}

/// Ground-state energy of the non-interacting system with the given filling.
pub fn free_fermion_energy<L: Lattice>(lattice: &L, t: &[f64], n_up: usize, n_down: usize) -> Result<f64> {
    check_filling(lattice.num_sites(), n_up, n_down)?;
    let (energies, _) = sorted_eigen(hopping_matrix(lattice, t));
    Ok(energies.rows(0, n_up).sum() + energies.rows(0, n_down).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::lattice::PeriodicLattice;

    #[test]
    fn test_hopping_matrix_chain() {
        let lat = PeriodicLattice::chain(4).unwrap();
        let h = hopping_matrix(&lat, &[1.0, 0.5]);
        assert_relative_eq!(h[(0, 1)], -1.0);
        assert_relative_eq!(h[(0, 3)], -1.0);
        assert_relative_eq!(h[(0, 2)], -0.5);
        assert_relative_eq!(h[(0, 0)], 0.0);
        assert_relative_eq!(h.clone(), h.transpose());
    }

    #[test]
    fn test_free_fermion_energy_chain() {
        // eigenvalues of the 6-site ring: -2, -1, -1, 1, 1, 2
        let lat = PeriodicLattice::chain(6).unwrap();
        let e = free_fermion_energy(&lat, &[1.0], 3, 3).unwrap();
        assert_relative_eq!(e, -8.0, epsilon = 1e-10);
        let e = free_fermion_energy(&lat, &[1.0], 1, 0).unwrap();
        assert_relative_eq!(e, -2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_orbital_blocks() {
        let lat = PeriodicLattice::chain(6).unwrap();
        let m = tight_binding_orbitals(&lat, &[1.0], 3, 2).unwrap();
        assert_eq!(m.shape(), (12, 5));
        // spin sectors do not mix
        assert_relative_eq!(m.view((6, 0), (6, 3)).amax(), 0.0);
        assert_relative_eq!(m.view((0, 3), (6, 2)).amax(), 0.0);
        // columns are normalised eigenvectors
        for c in 0..5 {
            assert_relative_eq!(m.column(c).norm(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_overfilling_rejected() {
        let lat = PeriodicLattice::chain(4).unwrap();
        assert!(tight_binding_orbitals(&lat, &[1.0], 5, 0).is_err());
        assert!(free_fermion_energy(&lat, &[1.0], 0, 5).is_err());
    }
}
