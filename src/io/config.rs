//! YAML run configuration and result output.
//!
//! Example configuration:
//!
//! ```yaml
//! lattice:
//!   type: chain
//!   length: 16
//! electrons: 16
//! t: [1.0]
//! u: 4.0
//! jastrow: [0.0, -0.3]
//! equilibration_sweeps: 1000
//! measurement_sweeps: 10000
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::lattice::LatticeShape;
use crate::observables::{MCCResults, Observable, ObservableEnergy, ObservableSpinSpinCorrelation};
use crate::sampling::MCMCParams;
use crate::systems::HubbardParams;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObservableKind {
    Energy,
    Sscorr,
}

impl ObservableKind {
    pub fn build(self) -> Box<dyn Observable> {
        match self {
            ObservableKind::Energy => Box::new(ObservableEnergy),
            ObservableKind::Sscorr => Box::new(ObservableSpinSpinCorrelation),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub lattice: LatticeShape,
    pub electrons: usize,
    pub t: Vec<f64>,
    #[serde(default)]
    pub u: f64,
    /// On-site and per-shell Jastrow parameters
    #[serde(default)]
    pub jastrow: Vec<f64>,
    #[serde(default = "default_update_hop_maxdist")]
    pub update_hop_maxdist: usize,
    #[serde(default = "default_updates_until_wt_recalc")]
    pub updates_until_wt_recalc: usize,
    #[serde(default)]
    pub consistency_check: bool,
    #[serde(default = "default_max_init_retries")]
    pub max_init_retries: usize,
    #[serde(default)]
    pub seed: u64,
    pub equilibration_sweeps: u64,
    pub measurement_sweeps: u64,
    #[serde(default = "default_sweeps_per_measurement")]
    pub sweeps_per_measurement: u64,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default = "default_observables")]
    pub observables: Vec<ObservableKind>,
}

fn default_update_hop_maxdist() -> usize {
    1
}

fn default_updates_until_wt_recalc() -> usize {
    50
}

fn default_max_init_retries() -> usize {
    1000
}

fn default_sweeps_per_measurement() -> u64 {
    1
}

fn default_observables() -> Vec<ObservableKind> {
    vec![ObservableKind::Energy, ObservableKind::Sscorr]
}

impl SimulationConfig {
    /// Electrons per spin sector, the odd one goes up.
    pub fn filling(&self) -> (usize, usize) {
        (self.electrons - self.electrons / 2, self.electrons / 2)
    }

    pub fn hubbard_params(&self) -> HubbardParams {
        HubbardParams::new()
            .with_t(self.t.clone())
            .with_u(self.u)
            .with_update_hop_maxdist(self.update_hop_maxdist)
            .with_updates_until_wt_recalc(self.updates_until_wt_recalc)
            .with_max_init_retries(self.max_init_retries)
            .with_consistency_check(self.consistency_check)
    }

    pub fn mcmc_params(&self) -> MCMCParams {
        MCMCParams {
            n_equilibration: self.equilibration_sweeps,
            n_measurements: self.measurement_sweeps,
            sweeps_per_measurement: self.sweeps_per_measurement,
        }
    }
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let file = File::open(path)?;
    let config = serde_yaml::from_reader(BufReader::new(file))?;
    Ok(config)
}

pub fn write_results<P: AsRef<Path>>(path: P, results: &MCCResults) -> Result<()> {
    let file = File::create(path)?;
    serde_yaml::to_writer(BufWriter::new(file), results)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let yaml = "
lattice:
  type: chain
  length: 8
electrons: 7
t: [1.0]
equilibration_sweeps: 10
measurement_sweeps: 20
";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lattice, LatticeShape::Chain { length: 8 });
        assert_eq!(config.filling(), (4, 3));
        assert_eq!(config.u, 0.0);
        assert!(config.jastrow.is_empty());
        assert_eq!(config.update_hop_maxdist, 1);
        assert_eq!(config.updates_until_wt_recalc, 50);
        assert!(!config.consistency_check);
        assert_eq!(config.max_init_retries, 1000);
        assert_eq!(config.sweeps_per_measurement, 1);
        assert_eq!(config.observables, vec![ObservableKind::Energy, ObservableKind::Sscorr]);
        assert!(config.output.is_none());

        let mcmc = config.mcmc_params();
        assert_eq!(mcmc.n_equilibration, 10);
        assert_eq!(mcmc.n_measurements, 20);
    }

    #[test]
    fn test_full_config() {
        let yaml = "
lattice:
  type: square
  lx: 4
  ly: 2
electrons: 8
t: [1.0, -0.2]
u: 4.0
jastrow: [0.0, -0.5]
update_hop_maxdist: 2
updates_until_wt_recalc: 10
consistency_check: true
max_init_retries: 5
seed: 17
equilibration_sweeps: 100
measurement_sweeps: 1000
sweeps_per_measurement: 4
output: results.yml
observables: [energy]
";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lattice, LatticeShape::Square { lx: 4, ly: 2 });
        assert_eq!(config.seed, 17);
        assert_eq!(config.output.as_deref(), Some("results.yml"));
        assert_eq!(config.observables, vec![ObservableKind::Energy]);

        let params = config.hubbard_params();
        assert_eq!(params.t, vec![1.0, -0.2]);
        assert_eq!(params.u, 4.0);
        assert_eq!(params.update_hop_maxdist, 2);
        assert_eq!(params.updates_until_wt_recalc, 10);
        assert_eq!(params.max_init_retries, 5);
        assert!(params.consistency_check);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let yaml = "lattice: {type: chain, length: 4}\nelectrons: 2\n";
        assert!(serde_yaml::from_str::<SimulationConfig>(yaml).is_err());
    }

    #[test]
    fn test_results_round_trip_through_file() {
        let results = MCCResults { mctime: 12, acceptance_rate: 0.5, ..MCCResults::default() };
        let path = std::env::temp_dir().join(format!("hubbard_vmc_results_{}.yml", std::process::id()));
        write_results(&path, &results).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(text.contains("mctime: 12"));
        let back: MCCResults = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_read_config_missing_file() {
        assert!(matches!(
            read_config("/nonexistent/hubbard_vmc.yml"),
            Err(crate::error::VmcError::Io(_))
        ));
    }
}
