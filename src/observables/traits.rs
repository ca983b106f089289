//! Seams between the sampler and the quantities measured on it.

use nalgebra::DVector;
use super::results::{Estimate, MCCResults};

/// Quantities a Markov chain state exposes to observables.
pub trait ObservableModel {
    /// Local energy per site.
    fn e_l(&self) -> f64;
    /// ⟨S^z_i S^z_j⟩ indexed by relative position.
    fn sz_sz_correlation(&self) -> DVector<f64>;
    /// Completed Monte Carlo sweeps.
    fn mctime(&self) -> u64;
}

/// Per-sample memo so that several observables share one evaluation.
#[derive(Debug, Clone, Default)]
pub struct ObservableCache {
    pub e_l: Option<f64>,
    pub s: Option<DVector<f64>>,
}

impl ObservableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.e_l = None;
        self.s = None;
    }

    pub fn e_l(&mut self, model: &dyn ObservableModel) -> f64 {
        *self.e_l.get_or_insert_with(|| model.e_l())
    }

    pub fn sz_sz_correlation(&mut self, model: &dyn ObservableModel) -> &DVector<f64> {
        self.s.get_or_insert_with(|| model.sz_sz_correlation())
    }
}

pub trait Observable {
    fn name(&self) -> &'static str;

    /// Value of the observable for the current state of `model`.
    fn get_current(&self, model: &dyn ObservableModel, cache: &mut ObservableCache) -> DVector<f64>;

    fn save_to_results(&self, estimate: Estimate, results: &mut MCCResults);
}
