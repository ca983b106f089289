//! Markov Chain Monte Carlo driver for Variational Monte Carlo of the
//! Hubbard model.
//!
//! The chain is equilibrated first, then observables are measured every
//! `sweeps_per_measurement` sweeps.

use rand::Rng;
use crate::error::{Result, VmcError};
use crate::lattice::Lattice;
use crate::observables::{MCCResults, Observable, ObservableAccumulator, ObservableCache};
use crate::systems::HubbardModelVmc;

/// Parameters for MCMC simulation.
#[derive(Copy, Clone, Debug)]
pub struct MCMCParams {
    pub n_equilibration: u64,
    pub n_measurements: u64,
    pub sweeps_per_measurement: u64,
}

impl Default for MCMCParams {
    fn default() -> Self {
        Self {
            n_equilibration: 1000,
            n_measurements: 10000,
            sweeps_per_measurement: 1,
        }
    }
}

/// MCMC simulation engine driving one Hubbard model chain.
pub struct MCMCSimulation<L: Lattice, R: Rng> {
    model: HubbardModelVmc<L, R>,
    params: MCMCParams,
    accumulators: Vec<ObservableAccumulator>,
}

impl<L: Lattice, R: Rng> MCMCSimulation<L, R> {
    pub fn new(model: HubbardModelVmc<L, R>, params: MCMCParams) -> Self {
        Self { model, params, accumulators: Vec::new() }
    }

    pub fn add_observable(&mut self, observable: Box<dyn Observable>) {
        self.accumulators.push(ObservableAccumulator::new(observable));
    }

    pub fn with_observable(mut self, observable: Box<dyn Observable>) -> Self {
        self.add_observable(observable);
        self
    }

    pub fn model(&self) -> &HubbardModelVmc<L, R> {
        &self.model
    }

    pub fn into_model(self) -> HubbardModelVmc<L, R> {
        self.model
    }

    /// Run the full MCMC simulation.
    pub fn run(&mut self) -> Result<MCCResults> {
        if self.params.sweeps_per_measurement == 0 {
            return Err(VmcError::InvalidParameter("sweeps_per_measurement must be at least 1".to_string()));
        }

        log::info!("equilibrating for {} sweeps", self.params.n_equilibration);
        self.model.equilibrate(self.params.n_equilibration)?;
        log::info!(
            "equilibration done, acceptance rate {:.4}",
            self.model.acceptance_rate()
        );

        let mut cache = ObservableCache::new();
        for measurement in 0..self.params.n_measurements {
            for _ in 0..self.params.sweeps_per_measurement {
                self.model.mcs()?;
            }
            cache.clear();
            for acc in self.accumulators.iter_mut() {
                acc.measure(&self.model, &mut cache);
            }
            if (measurement + 1) % 1000 == 0 {
                log::debug!("{} of {} measurements done", measurement + 1, self.params.n_measurements);
            }
        }

        let mut results = MCCResults {
            mctime: self.model.mctime(),
            acceptance_rate: self.model.acceptance_rate(),
            ..MCCResults::default()
        };
        for acc in &self.accumulators {
            acc.save_to_results(&mut results);
        }
        log::info!("finished after {} sweeps", results.mctime);
        Ok(results)
    }
}
