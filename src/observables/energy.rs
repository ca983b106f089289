use nalgebra::DVector;
use super::results::{Estimate, MCCResults};
use super::traits::{Observable, ObservableCache, ObservableModel};

/// Local energy per site.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservableEnergy;

impl Observable for ObservableEnergy {
    fn name(&self) -> &'static str {
        "E"
    }

    fn get_current(&self, model: &dyn ObservableModel, cache: &mut ObservableCache) -> DVector<f64> {
        DVector::from_element(1, cache.e_l(model))
    }

    fn save_to_results(&self, estimate: Estimate, results: &mut MCCResults) {
        results.energy = estimate.scalar();
    }
}
