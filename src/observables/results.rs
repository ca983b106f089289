use serde::{Deserialize, Serialize};

/// Mean and statistical error of a (possibly vector valued) observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub mean: Vec<f64>,
    pub error: Vec<f64>,
    pub autocorrelation_time: Vec<f64>,
}

/// Estimate of a scalar observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarEstimate {
    pub mean: f64,
    pub error: f64,
    pub autocorrelation_time: f64,
}

impl Estimate {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// First component as a scalar estimate.
    pub fn scalar(&self) -> Option<ScalarEstimate> {
        Some(ScalarEstimate {
            mean: *self.mean.first()?,
            error: *self.error.first()?,
            autocorrelation_time: *self.autocorrelation_time.first()?,
        })
    }
}

/// Results of a VMC run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MCCResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<ScalarEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sscorr: Option<Estimate>,
    pub mctime: u64,
    pub acceptance_rate: f64,
}
