//! Observables module - quantities measured along the Markov chain.

mod traits;
mod results;
mod energy;
mod sscorr;
mod accumulator;

pub use traits::{Observable, ObservableCache, ObservableModel};
pub use results::{Estimate, MCCResults, ScalarEstimate};
pub use energy::ObservableEnergy;
pub use sscorr::ObservableSpinSpinCorrelation;
pub use accumulator::ObservableAccumulator;
