//! Error type shared by the whole crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmcError {
    #[error("Slater matrix D stayed singular after {retries} random re-initialisations")]
    SingularInitialState { retries: usize },

    #[error("Slater matrix D is singular during {context}")]
    SingularSlaterMatrix { context: String },

    #[error(
        "updated {quantity}{index:?} = {updated} does not match recalculated value {recalculated} \
         ({updates_until_recalc} quick updates until recalc)"
    )]
    DriftMismatch {
        quantity: &'static str,
        index: (usize, usize),
        updated: f64,
        recalculated: f64,
        updates_until_recalc: usize,
    },

    #[error("Invalid hop: {0}")]
    InvalidHop(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid electron configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid Jastrow factor: {0}")]
    InvalidJastrow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, VmcError>;
