//! Periodic chain and square lattices.

use serde::{Deserialize, Serialize};
use crate::error::{Result, VmcError};
use super::traits::Lattice;

/// Chain (`ly = 1`) or rectangular lattice with periodic boundary conditions.
///
/// Distance shell `X` contains the sites at the X-th smallest distinct
/// minimum-image distance.
#[derive(Debug, Clone)]
pub struct PeriodicLattice {
    lx: usize,
    ly: usize,
    /// xnn_table[X - 1][i] for all 2L spin-orbitals
    xnn_table: Vec<Vec<Vec<usize>>>,
}

/// Shape description used by the YAML configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LatticeShape {
    Chain { length: usize },
    Square { lx: usize, ly: usize },
}

impl PeriodicLattice {
    /// Periodic chain of `length` sites.
    pub fn chain(length: usize) -> Result<Self> {
        Self::new(length, 1)
    }

    /// Periodic `lx × ly` square lattice.
    pub fn square(lx: usize, ly: usize) -> Result<Self> {
        Self::new(lx, ly)
    }

    pub fn from_shape(shape: &LatticeShape) -> Result<Self> {
        match *shape {
            LatticeShape::Chain { length } => Self::chain(length),
            LatticeShape::Square { lx, ly } => Self::square(lx, ly),
        }
    }

    fn new(lx: usize, ly: usize) -> Result<Self> {
        if lx == 0 || ly == 0 {
            return Err(VmcError::InvalidParameter(format!(
                "lattice dimensions must be positive, got {}x{}",
                lx, ly
            )));
        }
        let l = lx * ly;

        let mut radii: Vec<usize> = (1..l).map(|j| Self::minimum_image_r2(lx, ly, 0, j)).collect();
        radii.sort_unstable();
        radii.dedup();

        let mut xnn_table = Vec::with_capacity(radii.len());
        for &r2 in &radii {
            let mut shell = Vec::with_capacity(2 * l);
            for i in 0..l {
                let sites: Vec<usize> = (0..l)
                    .filter(|&j| j != i && Self::minimum_image_r2(lx, ly, i, j) == r2)
                    .collect();
                shell.push(sites);
            }
            for i in 0..l {
                let down: Vec<usize> = shell[i].iter().map(|&j| j + l).collect();
                shell.push(down);
            }
            xnn_table.push(shell);
        }

        Ok(Self { lx, ly, xnn_table })
    }

    /// Squared minimum-image distance between sites `i` and `j`.
    fn minimum_image_r2(lx: usize, ly: usize, i: usize, j: usize) -> usize {
        let (ix, iy) = (i % lx, i / lx);
        let (jx, jy) = (j % lx, j / lx);
        let dx = (jx + lx - ix) % lx;
        let dy = (jy + ly - iy) % ly;
        let dx = dx.min(lx - dx);
        let dy = dy.min(ly - dy);
        dx * dx + dy * dy
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.lx, self.ly)
    }
}

impl Lattice for PeriodicLattice {
    fn num_sites(&self) -> usize {
        self.lx * self.ly
    }

    fn num_shells(&self) -> usize {
        self.xnn_table.len()
    }

    fn xnn(&self, i: usize, x: usize) -> &[usize] {
        if x == 0 || x > self.xnn_table.len() {
            return &[];
        }
        &self.xnn_table[x - 1][i]
    }

    fn reduce_idxrel(&self, i: usize, j: usize) -> usize {
        let l = self.num_sites();
        let (i, j) = (i % l, j % l);
        let dx = (j % self.lx + self.lx - i % self.lx) % self.lx;
        let dy = (j / self.lx + self.ly - i / self.lx) % self.ly;
        dx + dy * self.lx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_shells() {
        let lat = PeriodicLattice::chain(6).unwrap();
        assert_eq!(lat.num_sites(), 6);
        assert_eq!(lat.num_shells(), 3);
        assert_eq!(lat.xnn(0, 1), &[1, 5]);
        assert_eq!(lat.xnn(0, 2), &[2, 4]);
        assert_eq!(lat.xnn(0, 3), &[3]);
        // spin-down orbitals stay in their sector
        assert_eq!(lat.xnn(6, 1), &[7, 11]);
        assert!(lat.xnn(0, 4).is_empty());
    }

    #[test]
    fn test_square_shells() {
        let lat = PeriodicLattice::square(4, 4).unwrap();
        assert_eq!(lat.num_sites(), 16);
        // nearest neighbours of site 5 = (1, 1)
        assert_eq!(lat.xnn(5, 1), &[1, 4, 6, 9]);
        // diagonal neighbours
        assert_eq!(lat.xnn(5, 2), &[0, 2, 8, 10]);
        for i in 0..16 {
            assert_eq!(lat.xnn(i, 1).len(), 4);
        }
    }

    #[test]
    fn test_two_site_chain_has_single_neighbour() {
        let lat = PeriodicLattice::chain(2).unwrap();
        assert_eq!(lat.xnn(0, 1), &[1]);
        assert_eq!(lat.xnn(3, 1), &[2]);
    }

    #[test]
    fn test_spinup_site_and_reduce_idxrel() {
        let lat = PeriodicLattice::square(3, 2).unwrap();
        assert_eq!(lat.spinup_site(7), 1);
        assert_eq!(lat.spinup_site(2), 2);
        assert_eq!(lat.reduce_idxrel(0, 4), 4);
        assert_eq!(lat.reduce_idxrel(4, 0), 2 + 3);
        assert_eq!(lat.reduce_idxrel(2, 3), 1 + 3);
        assert_eq!(lat.reduce_idxrel(7, 2), 1);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(PeriodicLattice::chain(0).is_err());
        assert!(PeriodicLattice::square(3, 0).is_err());
    }
}
