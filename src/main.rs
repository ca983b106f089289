use std::process;
use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hubbard_vmc::io::{read_config, write_results, SimulationConfig};
use hubbard_vmc::{
    free_fermion_energy, tight_binding_orbitals, HubbardModelVmc, Jastrow, Lattice, MCCResults,
    MCMCSimulation, PeriodicLattice, Result,
};

#[derive(Parser, Debug)]
#[command(version, about = "Variational Monte Carlo for the Hubbard model", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Override the random seed of the configuration file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Check every quick W/T update against a full recalculation
    #[arg(long)]
    check: bool,
}

fn run(config: &SimulationConfig) -> Result<MCCResults> {
    let lattice = Arc::new(PeriodicLattice::from_shape(&config.lattice)?);
    let (n_up, n_down) = config.filling();

    let m = tight_binding_orbitals(lattice.as_ref(), &config.t, n_up, n_down)?;
    let v = Jastrow::from_distance(lattice.as_ref(), &config.jastrow);
    let e0 = free_fermion_energy(lattice.as_ref(), &config.t, n_up, n_down)?;
    log::info!("free-fermion energy per site: {:.6}", e0 / lattice.num_sites() as f64);

    let model = HubbardModelVmc::new(
        StdRng::seed_from_u64(config.seed),
        lattice,
        m,
        v,
        config.electrons,
        config.hubbard_params(),
    )?;

    let mut simulation = MCMCSimulation::new(model, config.mcmc_params());
    for kind in &config.observables {
        simulation.add_observable(kind.build());
    }
    simulation.run()
}

fn print_results(config: &SimulationConfig, results: &MCCResults) {
    println!("VMC Simulation Results for the Hubbard Model");
    println!("--------------------------------------------");
    println!("Lattice: {:?}", config.lattice);
    println!("Electrons: {}", config.electrons);
    println!("U: {}", config.u);
    println!("Monte Carlo sweeps: {}", results.mctime);
    println!("Acceptance rate: {:.4}", results.acceptance_rate);
    if let Some(energy) = &results.energy {
        println!("Energy per site: {:.6} ± {:.6}", energy.mean, energy.error);
        println!("Autocorrelation time: {:.2} measurements", energy.autocorrelation_time);
    }
    if let Some(sscorr) = &results.sscorr {
        println!("Spin-spin correlation <Sz_0 Sz_r>:");
        for (r, (mean, error)) in sscorr.mean.iter().zip(sscorr.error.iter()).enumerate() {
            println!("  r = {:3}: {:.6} ± {:.6}", r, mean, error);
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut config = match read_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("failed to read {}: {}", args.config, e);
            process::exit(1);
        }
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.check {
        config.consistency_check = true;
    }

    let results = match run(&config) {
        Ok(results) => results,
        Err(e) => {
            log::error!("simulation failed: {}", e);
            process::exit(1);
        }
    };
    print_results(&config, &results);

    if let Some(output) = &config.output {
        if let Err(e) = write_results(output, &results) {
            log::error!("failed to write {}: {}", output, e);
            process::exit(1);
        }
        log::info!("results written to {}", output);
    }
}
