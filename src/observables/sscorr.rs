use nalgebra::DVector;
use super::results::{Estimate, MCCResults};
use super::traits::{Observable, ObservableCache, ObservableModel};

/// Spin-spin correlation ⟨S^z_i S^z_j⟩ as a function of relative position.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservableSpinSpinCorrelation;

impl Observable for ObservableSpinSpinCorrelation {
    fn name(&self) -> &'static str {
        "sscorr"
    }

    fn get_current(&self, model: &dyn ObservableModel, cache: &mut ObservableCache) -> DVector<f64> {
        cache.sz_sz_correlation(model).clone()
    }

    fn save_to_results(&self, estimate: Estimate, results: &mut MCCResults) {
        results.sscorr = Some(estimate);
    }
}
