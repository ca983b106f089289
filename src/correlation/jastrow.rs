//! Density-density Jastrow factor for lattice wavefunctions.
//!
//! The Jastrow factor multiplies the Slater determinant by
//! exp(½ Σᵢⱼ v(i,j) nᵢ nⱼ), where nᵢ is the total occupation of site i.

use approx::abs_diff_eq;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use crate::error::{Result, VmcError};
use crate::lattice::Lattice;

/// Symmetric pair correlation v(i,j) over lattice sites.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Jastrow {
    v: DMatrix<f64>,
}

impl Jastrow {
    /// Wrap an explicit `L × L` correlation matrix.
    pub fn new(v: DMatrix<f64>) -> Result<Self> {
        if !v.is_square() {
            return Err(VmcError::InvalidJastrow(format!(
                "v must be square, got {}x{}",
                v.nrows(),
                v.ncols()
            )));
        }
        for i in 0..v.nrows() {
            for j in (i + 1)..v.ncols() {
                if !abs_diff_eq!(v[(i, j)], v[(j, i)], epsilon = 1e-12) {
                    return Err(VmcError::InvalidJastrow(format!(
                        "v is not symmetric: v({}, {}) = {} but v({}, {}) = {}",
                        i, j, v[(i, j)], j, i, v[(j, i)]
                    )));
                }
            }
        }
        Ok(Self { v })
    }

    /// Uncorrelated Jastrow factor on `num_sites` sites.
    pub fn zeros(num_sites: usize) -> Self {
        Self { v: DMatrix::zeros(num_sites, num_sites) }
    }

    /// Translation-invariant Jastrow factor: `params[0]` on-site,
    /// `params[X]` between sites in neighbour shell X, zero beyond.
    pub fn from_distance<L: Lattice>(lattice: &L, params: &[f64]) -> Self {
        let l = lattice.num_sites();
        let mut v = DMatrix::zeros(l, l);
        for i in 0..l {
            if let Some(&onsite) = params.first() {
                v[(i, i)] = onsite;
            }
            for (x, &p) in params.iter().enumerate().skip(1) {
                for &j in lattice.xnn(i, x) {
                    v[(i, j)] = p;
                }
            }
        }
        Self { v }
    }

    pub fn num_sites(&self) -> usize {
        self.v.nrows()
    }

    /// v(i,j) for spin-orbital indices; both are reduced onto their site.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let l = self.v.nrows();
        self.v[(i % l, j % l)]
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::lattice::PeriodicLattice;

    #[test]
    fn test_from_distance_chain() {
        let lat = PeriodicLattice::chain(4).unwrap();
        let v = Jastrow::from_distance(&lat, &[0.5, -0.2, 0.1]);
        assert_relative_eq!(v.get(0, 0), 0.5);
        assert_relative_eq!(v.get(0, 1), -0.2);
        assert_relative_eq!(v.get(0, 3), -0.2);
        assert_relative_eq!(v.get(0, 2), 0.1);
        assert_relative_eq!(v.get(1, 2), -0.2);
    }

    #[test]
    fn test_spin_orbital_indices_reduce_to_sites() {
        let lat = PeriodicLattice::chain(4).unwrap();
        let v = Jastrow::from_distance(&lat, &[0.5, -0.2, 0.1]);
        // orbital 5 is the spin-down orbital of site 1
        assert_relative_eq!(v.get(5, 0), v.get(1, 0));
        assert_relative_eq!(v.get(6, 4), v.get(2, 0));
    }

    #[test]
    fn test_symmetry_is_enforced() {
        let mut m = DMatrix::zeros(3, 3);
        m[(0, 1)] = 1.0;
        assert!(Jastrow::new(m.clone()).is_err());
        m[(1, 0)] = 1.0;
        assert!(Jastrow::new(m).is_ok());
        assert!(Jastrow::new(DMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_short_params_leave_far_shells_zero() {
        let lat = PeriodicLattice::chain(6).unwrap();
        let v = Jastrow::from_distance(&lat, &[1.0]);
        assert_relative_eq!(v.get(2, 2), 1.0);
        assert_relative_eq!(v.get(0, 1), 0.0);
        assert_eq!(Jastrow::from_distance(&lat, &[]), Jastrow::zeros(6));
    }
}
