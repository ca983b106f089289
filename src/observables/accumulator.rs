use nalgebra::DVector;
use crate::sampling::stats::{autocorrelation_time, blocking_error, mean};
use super::results::{Estimate, MCCResults};
use super::traits::{Observable, ObservableCache, ObservableModel};

/// Collects the time series of one observable.
pub struct ObservableAccumulator {
    observable: Box<dyn Observable>,
    samples: Vec<DVector<f64>>,
}

impl ObservableAccumulator {
    pub fn new(observable: Box<dyn Observable>) -> Self {
        Self { observable, samples: Vec::new() }
    }

    pub fn name(&self) -> &'static str {
        self.observable.name()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn measure(&mut self, model: &dyn ObservableModel, cache: &mut ObservableCache) {
        let sample = self.observable.get_current(model, cache);
        log::trace!("{} = {}", self.observable.name(), sample.transpose());
        self.samples.push(sample);
    }

    /// Per-component mean, autocorrelation time and blocking error.
    pub fn estimate(&self) -> Estimate {
        let n_components = self.samples.first().map_or(0, |s| s.len());
        let mut estimate = Estimate {
            mean: Vec::with_capacity(n_components),
            error: Vec::with_capacity(n_components),
            autocorrelation_time: Vec::with_capacity(n_components),
        };
        for c in 0..n_components {
            let series: Vec<f64> = self.samples.iter().map(|s| s[c]).collect();
            let tau = autocorrelation_time(&series);
            estimate.mean.push(mean(&series));
            estimate.error.push(blocking_error(&series, tau));
            estimate.autocorrelation_time.push(tau);
        }
        estimate
    }

    pub fn save_to_results(&self, results: &mut MCCResults) {
        self.observable.save_to_results(self.estimate(), results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use approx::assert_relative_eq;
    use crate::observables::{ObservableEnergy, ObservableSpinSpinCorrelation};

    struct ScriptedModel {
        step: Cell<u64>,
        e_l_calls: Cell<usize>,
    }

    impl ObservableModel for ScriptedModel {
        fn e_l(&self) -> f64 {
            self.e_l_calls.set(self.e_l_calls.get() + 1);
            if self.step.get() % 2 == 0 { -1.0 } else { -0.5 }
        }

        fn sz_sz_correlation(&self) -> DVector<f64> {
            DVector::from_vec(vec![0.25, self.step.get() as f64])
        }

        fn mctime(&self) -> u64 {
            self.step.get()
        }
    }

    #[test]
    fn test_cache_evaluates_once_per_sample() {
        let model = ScriptedModel { step: Cell::new(0), e_l_calls: Cell::new(0) };
        let mut cache = ObservableCache::new();
        let energy = ObservableEnergy;
        energy.get_current(&model, &mut cache);
        energy.get_current(&model, &mut cache);
        assert_eq!(model.e_l_calls.get(), 1);
        cache.clear();
        energy.get_current(&model, &mut cache);
        assert_eq!(model.e_l_calls.get(), 2);
    }

    #[test]
    fn test_accumulated_estimates() {
        let model = ScriptedModel { step: Cell::new(0), e_l_calls: Cell::new(0) };
        let mut energy = ObservableAccumulator::new(Box::new(ObservableEnergy));
        let mut sscorr = ObservableAccumulator::new(Box::new(ObservableSpinSpinCorrelation));
        let mut cache = ObservableCache::new();
        for step in 0..10 {
            model.step.set(step);
            cache.clear();
            energy.measure(&model, &mut cache);
            sscorr.measure(&model, &mut cache);
        }
        assert_eq!(energy.num_samples(), 10);

        let mut results = MCCResults::default();
        energy.save_to_results(&mut results);
        sscorr.save_to_results(&mut results);

        let e = results.energy.unwrap();
        assert_relative_eq!(e.mean, -0.75);
        // alternating series, each block of two has the same mean
        assert_relative_eq!(e.error, 0.0);

        let s = results.sscorr.unwrap();
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s.mean[0], 0.25);
        assert_relative_eq!(s.mean[1], 4.5);
        assert_relative_eq!(s.error[0], 0.0);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = ObservableAccumulator::new(Box::new(ObservableEnergy));
        let mut results = MCCResults::default();
        acc.save_to_results(&mut results);
        assert!(acc.estimate().is_empty());
        assert!(results.energy.is_none());
    }
}
