//! Variational Monte Carlo state for the Hubbard model.
//!
//! The trial wavefunction is a Slater determinant of the orbitals M times a
//! density-density Jastrow factor. Two quantities are kept in sync with the
//! electron configuration:
//!
//! - W = M · D⁻¹ (2L × N), where D[e,:] = M[position(e),:]. W(l,k) is the
//!   ratio of Slater determinants after moving electron k to orbital l.
//! - T (length L), T(i) = exp(Σⱼ v(i,j) nⱼ), with nⱼ the total occupation of
//!   site j, from which Jastrow ratios are read off.
//!
//! After an accepted hop both are updated in O(LN) (W) and O(L) (T); every
//! `updates_until_wt_recalc` quick updates they are rebuilt from scratch.

use std::sync::Arc;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use crate::correlation::Jastrow;
use crate::error::{Result, VmcError};
use crate::lattice::Lattice;
use crate::observables::ObservableModel;
use crate::wavefunction::{invert_slater, slater_matrix};
use super::econf::{ElectronConfiguration, ElectronHop, SiteOccupation};

/// Elements whose magnitudes sum below this are not compared by ratio.
const DRIFT_ABS_TOLERANCE: f64 = 0.001;
const W_DRIFT_REL_TOLERANCE: f64 = 0.01;
const T_DRIFT_REL_TOLERANCE: f64 = 0.001;

/// Model and update-protocol parameters, fixed at construction.
#[derive(Clone, Debug)]
pub struct HubbardParams {
    /// Hopping amplitudes, t[X-1] between sites at distance X
    pub t: Vec<f64>,
    /// On-site interaction strength
    pub u: f64,
    /// Largest distance of a proposed hop
    pub update_hop_maxdist: usize,
    /// Quick W/T updates performed between two full recalculations
    pub updates_until_wt_recalc: usize,
    /// Random re-initialisations tried while D is singular
    pub max_init_retries: usize,
    /// Compare every quick update against a full recalculation
    pub consistency_check: bool,
    /// Smallest pivot ratio for which D counts as invertible
    pub singularity_tolerance: f64,
}

impl Default for HubbardParams {
    fn default() -> Self {
        Self {
            t: vec![1.0],
            u: 0.0,
            update_hop_maxdist: 1,
            updates_until_wt_recalc: 50,
            max_init_retries: 1000,
            consistency_check: false,
            singularity_tolerance: 1e-12,
        }
    }
}

impl HubbardParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_t(mut self, t: Vec<f64>) -> Self {
        self.t = t;
        self
    }

    pub fn with_u(mut self, u: f64) -> Self {
        self.u = u;
        self
    }

    pub fn with_update_hop_maxdist(mut self, maxdist: usize) -> Self {
        self.update_hop_maxdist = maxdist;
        self
    }

    pub fn with_updates_until_wt_recalc(mut self, q: usize) -> Self {
        self.updates_until_wt_recalc = q;
        self
    }

    pub fn with_max_init_retries(mut self, retries: usize) -> Self {
        self.max_init_retries = retries;
        self
    }

    pub fn with_consistency_check(mut self, check: bool) -> Self {
        self.consistency_check = check;
        self
    }
}

/// One Markov chain sampling |Ψ|² for the Hubbard model.
pub struct HubbardModelVmc<L: Lattice, R: Rng> {
    rng: R,
    lattice: Arc<L>,
    m: DMatrix<f64>,
    v: Jastrow,
    params: HubbardParams,
    econf: ElectronConfiguration<L>,
    w: DMatrix<f64>,
    tv: DVector<f64>,
    completed_mcsteps: u64,
    updates_since_wt_recalc: usize,
    proposed_steps: u64,
    accepted_steps: u64,
    uniform: Uniform<f64>,
}

impl<L: Lattice, R: Rng> HubbardModelVmc<L, R> {
    /// Place `n` electrons at random and bring up the variational state.
    pub fn new(
        mut rng: R,
        lattice: Arc<L>,
        m: DMatrix<f64>,
        v: Jastrow,
        n: usize,
        params: HubbardParams,
    ) -> Result<Self> {
        let econf = ElectronConfiguration::new(lattice.clone(), n, &mut rng)?;
        Self::with_configuration(rng, lattice, m, v, econf, params)
    }

    /// Start from a given electron configuration. If its Slater matrix is
    /// singular the electrons are redistributed at random, at most
    /// `params.max_init_retries` times.
    pub fn with_configuration(
        mut rng: R,
        lattice: Arc<L>,
        m: DMatrix<f64>,
        v: Jastrow,
        mut econf: ElectronConfiguration<L>,
        params: HubbardParams,
    ) -> Result<Self> {
        Self::check_dimensions(lattice.as_ref(), &m, &v, econf.n(), &params)?;

        // there must be a non-zero overlap between the Slater determinant and |x>
        let mut retries = 0;
        let d_inv = loop {
            let d = slater_matrix(&m, econf.electron_positions());
            if let Some(d_inv) = invert_slater(&d, params.singularity_tolerance) {
                break d_inv;
            }
            if retries >= params.max_init_retries {
                return Err(VmcError::SingularInitialState { retries });
            }
            log::warn!("matrix D is not invertible, redistributing electrons (attempt {})", retries + 1);
            econf.distribute_random(&mut rng);
            retries += 1;
        };
        let w = &m * d_inv;

        let l = lattice.num_sites();
        let mut model = Self {
            rng,
            lattice,
            m,
            v,
            params,
            econf,
            w,
            tv: DVector::zeros(l),
            completed_mcsteps: 0,
            updates_since_wt_recalc: 0,
            proposed_steps: 0,
            accepted_steps: 0,
            uniform: Uniform::new(0.0, 1.0),
        };
        model.tv = model.calc_new_t();

        log::info!(
            "initialised Hubbard VMC with L = {}, N = {} after {} re-initialisations",
            l,
            model.econf.n(),
            retries
        );
        log::trace!("initial W = {}", model.w);
        Ok(model)
    }

    fn check_dimensions(lattice: &L, m: &DMatrix<f64>, v: &Jastrow, n: usize, params: &HubbardParams) -> Result<()> {
        let l = lattice.num_sites();
        if m.shape() != (2 * l, n) {
            return Err(VmcError::InvalidParameter(format!(
                "orbital matrix is {}x{}, expected {}x{}",
                m.nrows(),
                m.ncols(),
                2 * l,
                n
            )));
        }
        if v.num_sites() != l {
            return Err(VmcError::InvalidParameter(format!(
                "Jastrow factor covers {} sites, lattice has {}",
                v.num_sites(),
                l
            )));
        }
        if params.update_hop_maxdist == 0 {
            return Err(VmcError::InvalidParameter("update_hop_maxdist must be at least 1".to_string()));
        }
        if !(params.singularity_tolerance >= 0.0) {
            return Err(VmcError::InvalidParameter(format!(
                "singularity tolerance must be non-negative, got {}",
                params.singularity_tolerance
            )));
        }
        if params.update_hop_maxdist > lattice.num_shells() {
            log::warn!(
                "update_hop_maxdist = {} exceeds the {} neighbour shells of the lattice",
                params.update_hop_maxdist,
                lattice.num_shells()
            );
        }
        Ok(())
    }

    /// One Monte Carlo sweep: N Metropolis steps.
    pub fn mcs(&mut self) -> Result<()> {
        log::debug!("starting Monte Carlo step {}", self.completed_mcsteps);
        for _ in 0..self.econf.n() {
            self.metstep()?;
        }
        self.completed_mcsteps += 1;
        Ok(())
    }

    /// Run `n_mcs_equil` sweeps without advancing the Monte Carlo time.
    pub fn equilibrate(&mut self, n_mcs_equil: u64) -> Result<()> {
        for _ in 0..n_mcs_equil {
            self.mcs()?;
        }
        self.completed_mcsteps -= n_mcs_equil;
        Ok(())
    }

    /// Propose a single hop and accept or reject it. Returns whether the
    /// configuration changed.
    pub fn metstep(&mut self) -> Result<bool> {
        let hop = self.econf.propose_random_hop(self.params.update_hop_maxdist, &mut self.rng);
        self.proposed_steps += 1;

        if !hop.possible {
            log::debug!("metstep: hop {:?} impossible", hop);
            return Ok(false);
        }

        let accept_prob = self.acceptance_probability(&hop);
        log::debug!(
            "metstep: hop {:?} possible, sdwf_ratio = {}, accept_prob = {}",
            hop,
            self.w[(hop.l, hop.k)],
            accept_prob
        );

        if accept_prob >= 1.0 || self.uniform.sample(&mut self.rng) < accept_prob {
            log::debug!("metstep: hop accepted");
            self.apply_hop(&hop)?;
            self.accepted_steps += 1;
            Ok(true)
        } else {
            log::debug!("metstep: hop rejected");
            Ok(false)
        }
    }

    /// Jastrow part of the wavefunction ratio for moving an electron from
    /// `k_pos` to `l`.
    fn jastrow_ratio(&self, k_pos: usize, l: usize) -> f64 {
        self.tv[self.lattice.spinup_site(l)] / self.tv[self.lattice.spinup_site(k_pos)]
            * (self.v.get(0, 0) - self.v.get(l, k_pos)).exp()
    }

    /// |Ψ(x')/Ψ(x)|² for the configuration reached by `hop`.
    pub fn acceptance_probability(&self, hop: &ElectronHop) -> f64 {
        let r_j = self.jastrow_ratio(hop.k_pos, hop.l);
        let ratio = r_j * self.w[(hop.l, hop.k)];
        ratio * ratio
    }

    /// Commit an accepted hop to the configuration and bring W and T up to date.
    pub fn apply_hop(&mut self, hop: &ElectronHop) -> Result<()> {
        self.econf.validate_hop(hop)?;
        if self.w[(hop.l, hop.k)] == 0.0 {
            return Err(VmcError::InvalidHop(format!("{:?} has zero overlap and would make D singular", hop)));
        }
        self.econf.do_hop(hop);
        self.perform_wt_update(hop)
    }

    fn perform_wt_update(&mut self, hop: &ElectronHop) -> Result<()> {
        if self.updates_since_wt_recalc >= self.params.updates_until_wt_recalc {
            log::debug!("perform_wt_update: recalculating W and T");
            self.w = self.calc_new_w()?;
            self.tv = self.calc_new_t();
            self.updates_since_wt_recalc = 0;
        } else {
            log::debug!("perform_wt_update: performing a quick update");
            log::trace!("previous W = {}", self.w);
            self.w = self.calc_updated_w(hop);
            log::trace!("updated W = {}", self.w);
            log::trace!("previous T = {}", self.tv.transpose());
            self.tv = self.calc_updated_t(hop);
            log::trace!("updated T = {}", self.tv.transpose());

            if self.params.consistency_check {
                self.check_wt_consistency()?;
            }
            self.updates_since_wt_recalc += 1;
        }
        Ok(())
    }

    fn check_wt_consistency(&self) -> Result<()> {
        let updates_until_recalc = self.params.updates_until_wt_recalc - self.updates_since_wt_recalc;

        let w_chk = self.calc_new_w()?;
        for j in 0..self.w.ncols() {
            for i in 0..self.w.nrows() {
                if !drift_within(self.w[(i, j)], w_chk[(i, j)], W_DRIFT_REL_TOLERANCE) {
                    log::trace!("correct (recalculated) W = {}", w_chk);
                    return Err(VmcError::DriftMismatch {
                        quantity: "W",
                        index: (i, j),
                        updated: self.w[(i, j)],
                        recalculated: w_chk[(i, j)],
                        updates_until_recalc,
                    });
                }
            }
        }

        let t_chk = self.calc_new_t();
        for i in 0..self.tv.len() {
            if !drift_within(self.tv[i], t_chk[i], T_DRIFT_REL_TOLERANCE) {
                return Err(VmcError::DriftMismatch {
                    quantity: "T",
                    index: (i, 0),
                    updated: self.tv[i],
                    recalculated: t_chk[i],
                    updates_until_recalc,
                });
            }
        }
        Ok(())
    }

    /// Slater matrix of the current configuration.
    pub fn calc_d(&self) -> DMatrix<f64> {
        slater_matrix(&self.m, self.econf.electron_positions())
    }

    /// W = M · D⁻¹ from scratch.
    pub fn calc_new_w(&self) -> Result<DMatrix<f64>> {
        let d_inv = invert_slater(&self.calc_d(), self.params.singularity_tolerance).ok_or_else(|| {
            VmcError::SingularSlaterMatrix {
                context: format!("recalculation of W at positions {:?}", self.econf.electron_positions()),
            }
        })?;
        Ok(&self.m * d_inv)
    }

    /// Rank-one update of W for a single-row replacement of D.
    pub fn calc_updated_w(&self, hop: &ElectronHop) -> DMatrix<f64> {
        let col = self.w.column(hop.k) / self.w[(hop.l, hop.k)];
        let row = self.w.row(hop.l) - self.w.row(hop.k_pos);
        &self.w - col * row
    }

    fn total_occupation(&self, site: usize) -> usize {
        let l = self.lattice.num_sites();
        [site, site + l]
            .iter()
            .filter(|&&i| self.econf.get_site_occ(i) == SiteOccupation::Full)
            .count()
    }

    /// T from scratch.
    pub fn calc_new_t(&self) -> DVector<f64> {
        let l = self.lattice.num_sites();
        let n: Vec<f64> = (0..l).map(|j| self.total_occupation(j) as f64).collect();
        DVector::from_fn(l, |i, _| {
            let sum: f64 = n.iter().enumerate().map(|(j, &n_j)| self.v.get(i, j) * n_j).sum();
            sum.exp()
        })
    }

    /// T after moving one electron from `hop.k_pos` to `hop.l`.
    pub fn calc_updated_t(&self, hop: &ElectronHop) -> DVector<f64> {
        let from = self.lattice.spinup_site(hop.k_pos);
        let to = self.lattice.spinup_site(hop.l);
        DVector::from_fn(self.tv.len(), |i, _| {
            self.tv[i] * (self.v.get(i, to) - self.v.get(i, from)).exp()
        })
    }

    /// Local energy per site of the current configuration.
    pub fn e_l(&self) -> f64 {
        let mut e_l_kin = 0.0;

        for k in 0..self.econf.n() {
            let k_pos = self.econf.get_electron_pos(k);
            debug_assert_eq!(self.econf.get_site_occ(k_pos), SiteOccupation::Full);

            for (x, &t_x) in self.params.t.iter().enumerate() {
                if t_x == 0.0 {
                    continue;
                }
                let sum_xnn: f64 = self
                    .lattice
                    .xnn(k_pos, x + 1)
                    .iter()
                    .filter(|&&l| self.econf.get_site_occ(l) == SiteOccupation::Empty)
                    .map(|&l| self.jastrow_ratio(k_pos, l) * self.w[(l, k)])
                    .sum();
                e_l_kin -= t_x * sum_xnn;
            }
        }

        let e_l = (e_l_kin + self.params.u * self.econf.get_num_dblocc() as f64)
            / self.lattice.num_sites() as f64;
        log::trace!("E_l = {}", e_l);
        e_l
    }

    /// Spin-spin correlation ⟨S^z_i S^z_j⟩ folded onto the displacement j - i.
    pub fn sz_sz_correlation(&self) -> DVector<f64> {
        let l = self.lattice.num_sites();
        let occ = |i: usize| (self.econf.get_site_occ(i) == SiteOccupation::Full) as u8 as f64;
        let sz: Vec<f64> = (0..l).map(|i| 0.5 * (occ(i) - occ(i + l))).collect();

        let mut s = DVector::zeros(l);
        for i in 0..l {
            for j in 0..l {
                s[self.lattice.reduce_idxrel(i, j)] += sz[i] * sz[j];
            }
        }
        s / l as f64
    }

    /// Completed Monte Carlo sweeps.
    pub fn mctime(&self) -> u64 {
        self.completed_mcsteps
    }

    pub fn w(&self) -> &DMatrix<f64> {
        &self.w
    }

    pub fn t(&self) -> &DVector<f64> {
        &self.tv
    }

    pub fn orbitals(&self) -> &DMatrix<f64> {
        &self.m
    }

    pub fn jastrow(&self) -> &Jastrow {
        &self.v
    }

    pub fn configuration(&self) -> &ElectronConfiguration<L> {
        &self.econf
    }

    pub fn lattice(&self) -> &L {
        &self.lattice
    }

    pub fn params(&self) -> &HubbardParams {
        &self.params
    }

    /// Quick updates since the last full recalculation of W and T.
    pub fn updates_since_wt_recalc(&self) -> usize {
        self.updates_since_wt_recalc
    }

    /// Fraction of proposed hops that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposed_steps == 0 {
            return 0.0;
        }
        self.accepted_steps as f64 / self.proposed_steps as f64
    }
}

impl<L: Lattice, R: Rng> ObservableModel for HubbardModelVmc<L, R> {
    fn e_l(&self) -> f64 {
        HubbardModelVmc::e_l(self)
    }

    fn sz_sz_correlation(&self) -> DVector<f64> {
        HubbardModelVmc::sz_sz_correlation(self)
    }

    fn mctime(&self) -> u64 {
        HubbardModelVmc::mctime(self)
    }
}

/// Whether an incrementally updated value agrees with its recalculation.
fn drift_within(updated: f64, recalculated: f64, rel_tolerance: f64) -> bool {
    if updated.abs() + recalculated.abs() < DRIFT_ABS_TOLERANCE {
        return true;
    }
    let ratio = updated / recalculated;
    ratio < 1.0 + rel_tolerance && ratio > 1.0 - rel_tolerance
}
