//! Electron configuration on a lattice: which spin-orbitals are occupied
//! and by which electron.

use std::sync::Arc;
use rand::seq::index::sample;
use rand::Rng;
use crate::error::{Result, VmcError};
use crate::lattice::Lattice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOccupation {
    Empty,
    Full,
}

/// Candidate move of electron `k` from spin-orbital `k_pos` to `l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectronHop {
    pub k: usize,
    pub k_pos: usize,
    pub l: usize,
    /// false if `l` is already occupied
    pub possible: bool,
}

/// Positions of N electrons on the 2L spin-orbitals of a lattice.
///
/// An electron keeps its spin for its whole lifetime: hops only connect
/// spin-orbitals of the same spin sector.
#[derive(Debug, Clone)]
pub struct ElectronConfiguration<L: Lattice> {
    lattice: Arc<L>,
    electron_pos: Vec<usize>,
    site_occ: Vec<SiteOccupation>,
}

impl<L: Lattice> ElectronConfiguration<L> {
    /// Place `n` electrons at random, `n - n/2` of them with spin up.
    pub fn new<R: Rng>(lattice: Arc<L>, n: usize, rng: &mut R) -> Result<Self> {
        let l = lattice.num_sites();
        let n_up = n - n / 2;
        if n == 0 || n_up > l {
            return Err(VmcError::InvalidConfiguration(format!(
                "cannot place {} electrons on {} sites",
                n, l
            )));
        }
        // spin-up electrons first, then spin-down ones
        let mut electron_pos: Vec<usize> = (0..n_up).collect();
        electron_pos.extend(l..l + n - n_up);

        let mut econf = Self {
            lattice,
            electron_pos,
            site_occ: vec![SiteOccupation::Empty; 2 * l],
        };
        econf.distribute_random(rng);
        Ok(econf)
    }

    /// Place electron `e` on spin-orbital `positions[e]`.
    pub fn from_positions(lattice: Arc<L>, positions: Vec<usize>) -> Result<Self> {
        let l = lattice.num_sites();
        if positions.is_empty() {
            return Err(VmcError::InvalidConfiguration("no electrons given".to_string()));
        }
        let mut site_occ = vec![SiteOccupation::Empty; 2 * l];
        for &pos in &positions {
            if pos >= 2 * l {
                return Err(VmcError::InvalidConfiguration(format!(
                    "spin-orbital {} out of range for {} sites",
                    pos, l
                )));
            }
            if site_occ[pos] == SiteOccupation::Full {
                return Err(VmcError::InvalidConfiguration(format!(
                    "spin-orbital {} occupied twice",
                    pos
                )));
            }
            site_occ[pos] = SiteOccupation::Full;
        }
        Ok(Self { lattice, electron_pos: positions, site_occ })
    }

    /// Number of electrons N.
    pub fn n(&self) -> usize {
        self.electron_pos.len()
    }

    pub fn num_up(&self) -> usize {
        let l = self.lattice.num_sites();
        self.electron_pos.iter().filter(|&&pos| pos < l).count()
    }

    pub fn get_electron_pos(&self, k: usize) -> usize {
        self.electron_pos[k]
    }

    pub fn electron_positions(&self) -> &[usize] {
        &self.electron_pos
    }

    pub fn get_site_occ(&self, i: usize) -> SiteOccupation {
        self.site_occ[i]
    }

    /// Number of sites occupied by both a spin-up and a spin-down electron.
    pub fn get_num_dblocc(&self) -> usize {
        let l = self.lattice.num_sites();
        (0..l)
            .filter(|&i| {
                self.site_occ[i] == SiteOccupation::Full && self.site_occ[i + l] == SiteOccupation::Full
            })
            .count()
    }

    /// Redistribute all electrons uniformly at random, keeping their spins.
    pub fn distribute_random<R: Rng>(&mut self, rng: &mut R) {
        let l = self.lattice.num_sites();
        let (up, down): (Vec<usize>, Vec<usize>) = (0..self.n()).partition(|&e| self.electron_pos[e] < l);

        self.site_occ.iter_mut().for_each(|occ| *occ = SiteOccupation::Empty);
        for (electrons, offset) in [(up, 0), (down, l)] {
            let sites = sample(rng, l, electrons.len());
            for (e, site) in electrons.into_iter().zip(sites.into_iter()) {
                self.electron_pos[e] = site + offset;
                self.site_occ[site + offset] = SiteOccupation::Full;
            }
        }
    }

    /// Propose moving a random electron to a random spin-orbital at a random
    /// distance between 1 and `max_dist`.
    pub fn propose_random_hop<R: Rng>(&self, max_dist: usize, rng: &mut R) -> ElectronHop {
        let k = rng.gen_range(0..self.n());
        let k_pos = self.electron_pos[k];
        let x = rng.gen_range(1..=max_dist.max(1));
        let candidates = self.lattice.xnn(k_pos, x);
        if candidates.is_empty() {
            return ElectronHop { k, k_pos, l: k_pos, possible: false };
        }
        let l = candidates[rng.gen_range(0..candidates.len())];
        ElectronHop { k, k_pos, l, possible: self.site_occ[l] == SiteOccupation::Empty }
    }

    /// Check that `hop` is a legal move from the current configuration.
    pub fn validate_hop(&self, hop: &ElectronHop) -> Result<()> {
        let l = self.lattice.num_sites();
        if !hop.possible {
            return Err(VmcError::InvalidHop(format!("{:?} is flagged impossible", hop)));
        }
        if hop.k >= self.n() || self.electron_pos[hop.k] != hop.k_pos {
            return Err(VmcError::InvalidHop(format!(
                "{:?} does not match the position of electron {}",
                hop, hop.k
            )));
        }
        if hop.l >= 2 * l || self.site_occ[hop.l] == SiteOccupation::Full {
            return Err(VmcError::InvalidHop(format!("{:?} targets an occupied or invalid orbital", hop)));
        }
        if (hop.k_pos < l) != (hop.l < l) {
            return Err(VmcError::InvalidHop(format!("{:?} flips the electron spin", hop)));
        }
        Ok(())
    }

    /// Move the electron. The hop must have been validated.
    pub fn do_hop(&mut self, hop: &ElectronHop) {
        debug_assert_eq!(self.site_occ[hop.k_pos], SiteOccupation::Full);
        debug_assert_eq!(self.site_occ[hop.l], SiteOccupation::Empty);
        self.site_occ[hop.k_pos] = SiteOccupation::Empty;
        self.site_occ[hop.l] = SiteOccupation::Full;
        self.electron_pos[hop.k] = hop.l;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::lattice::PeriodicLattice;

    fn chain(l: usize) -> Arc<PeriodicLattice> {
        Arc::new(PeriodicLattice::chain(l).unwrap())
    }

    #[test]
    fn test_random_placement_respects_spins() {
        let mut rng = StdRng::seed_from_u64(7);
        let econf = ElectronConfiguration::new(chain(5), 7, &mut rng).unwrap();
        assert_eq!(econf.n(), 7);
        assert_eq!(econf.num_up(), 4);
        let full = (0..10).filter(|&i| econf.get_site_occ(i) == SiteOccupation::Full).count();
        assert_eq!(full, 7);
        for k in 0..4 {
            assert!(econf.get_electron_pos(k) < 5);
        }
        for k in 4..7 {
            assert!(econf.get_electron_pos(k) >= 5);
        }
        // 4 up and 3 down electrons on 5 sites share at least 2 sites
        assert!(econf.get_num_dblocc() >= 2);
    }

    #[test]
    fn test_too_many_electrons() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(ElectronConfiguration::new(chain(3), 8, &mut rng).is_err());
        assert!(ElectronConfiguration::new(chain(3), 0, &mut rng).is_err());
        assert!(ElectronConfiguration::from_positions(chain(3), vec![1, 1]).is_err());
        assert!(ElectronConfiguration::from_positions(chain(3), vec![6]).is_err());
    }

    #[test]
    fn test_dblocc_and_hop() {
        let mut econf = ElectronConfiguration::from_positions(chain(4), vec![0, 4, 6]).unwrap();
        assert_eq!(econf.get_num_dblocc(), 1);

        let hop = ElectronHop { k: 0, k_pos: 0, l: 1, possible: true };
        econf.validate_hop(&hop).unwrap();
        econf.do_hop(&hop);
        assert_eq!(econf.get_electron_pos(0), 1);
        assert_eq!(econf.get_site_occ(0), SiteOccupation::Empty);
        assert_eq!(econf.get_site_occ(1), SiteOccupation::Full);
        assert_eq!(econf.get_num_dblocc(), 0);
    }

    #[test]
    fn test_invalid_hops() {
        let econf = ElectronConfiguration::from_positions(chain(4), vec![0, 1, 4]).unwrap();
        let occupied = ElectronHop { k: 0, k_pos: 0, l: 1, possible: true };
        assert!(econf.validate_hop(&occupied).is_err());
        let wrong_pos = ElectronHop { k: 0, k_pos: 3, l: 2, possible: true };
        assert!(econf.validate_hop(&wrong_pos).is_err());
        let spin_flip = ElectronHop { k: 0, k_pos: 0, l: 5, possible: true };
        assert!(econf.validate_hop(&spin_flip).is_err());
        let flagged = ElectronHop { k: 0, k_pos: 0, l: 3, possible: false };
        assert!(econf.validate_hop(&flagged).is_err());
    }

    #[test]
    fn test_proposals_are_neighbours() {
        let mut rng = StdRng::seed_from_u64(42);
        let lat = chain(6);
        let econf = ElectronConfiguration::new(lat.clone(), 4, &mut rng).unwrap();
        for _ in 0..200 {
            let hop = econf.propose_random_hop(2, &mut rng);
            assert_eq!(hop.k_pos, econf.get_electron_pos(hop.k));
            assert!(lat.xnn(hop.k_pos, 1).contains(&hop.l) || lat.xnn(hop.k_pos, 2).contains(&hop.l));
            assert_eq!(hop.possible, econf.get_site_occ(hop.l) == SiteOccupation::Empty);
        }
    }

    #[test]
    fn test_distribute_random_keeps_counts() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut econf = ElectronConfiguration::from_positions(chain(4), vec![0, 5, 1]).unwrap();
        for _ in 0..20 {
            econf.distribute_random(&mut rng);
            assert_eq!(econf.num_up(), 2);
            assert!(econf.get_electron_pos(1) >= 4);
            let full = (0..8).filter(|&i| econf.get_site_occ(i) == SiteOccupation::Full).count();
            assert_eq!(full, 3);
        }
    }
}
