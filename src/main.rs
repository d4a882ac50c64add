//! Command line driver: load a run configuration and a structure (or build an
//! argon fcc lattice), then sample with HMC and volume moves.
//!
//! Usage:
//!   hmc_npt --config run.json --structure argon.json --output out/
//!   hmc_npt --fcc-cells 6 --sweeps 10000 --seed 7

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kdam::tqdm;

use hmc_npt::lj_parameters::{LJParameters, ARGON_MASS};
use hmc_npt::{
    CadenceController, FileSink, LennardJonesEngine, ReportSink, RunConfig, Sampler, SeededStream,
    Structure, UnitSystem,
};

#[derive(Parser, Debug)]
#[command(name = "hmc_npt")]
#[command(about = "Hybrid Monte Carlo sampling in the NVT and NPT ensembles")]
struct Args {
    /// Run configuration (JSON); defaults are used for anything missing
    #[arg(long)]
    config: Option<PathBuf>,

    /// Structure file (JSON), for example a restart snapshot from an earlier run
    #[arg(long)]
    structure: Option<PathBuf>,

    /// Without --structure, build an argon fcc lattice of this many unit cells per edge
    #[arg(long, default_value = "6")]
    fcc_cells: usize,

    /// Lattice constant of the generated lattice in Angstrom
    #[arg(long, default_value = "5.26")]
    lattice_constant: f64,

    /// Pair cutoff of the generated lattice in Angstrom
    #[arg(long, default_value = "8.5")]
    cutoff: f64,

    /// Output directory, overrides the configuration
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of sweeps, overrides the configuration
    #[arg(long)]
    sweeps: Option<u64>,

    /// Random seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Probability of an HMC move, overrides the configuration
    #[arg(long)]
    p_hmc: Option<f64>,

    /// Temperature in Kelvin, overrides the configuration
    #[arg(long)]
    temperature: Option<f64>,

    /// Pressure in the engine's pressure unit, overrides the configuration
    #[arg(long)]
    pressure: Option<f64>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn load_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(dir) = &args.output {
        config.output.directory = dir.clone();
    }
    if let Some(n) = args.sweeps {
        config.n_sweeps = n;
    }
    if let Some(seed) = args.seed {
        config.ensemble.seed = seed;
    }
    if let Some(p) = args.p_hmc {
        config.ensemble.p_hmc = p;
    }
    if let Some(t) = args.temperature {
        config.ensemble.temperature = t;
    }
    if let Some(p) = args.pressure {
        config.ensemble.pressure = p;
    }
    config.validate().context("invalid run configuration")?;
    Ok(config)
}

fn load_structure(args: &Args, units: UnitSystem) -> Result<Structure> {
    let structure = match &args.structure {
        Some(path) => Structure::from_file(path)
            .with_context(|| format!("failed to read structure {}", path.display()))?,
        None => {
            if units != UnitSystem::Real {
                bail!("the built-in argon lattice is parameterised in real units");
            }
            log::info!(
                "building argon fcc lattice: {} cells per edge, a = {} A, cutoff = {} A",
                args.fcc_cells,
                args.lattice_constant,
                args.cutoff
            );
            Structure::fcc_lattice(
                args.fcc_cells,
                args.lattice_constant,
                LJParameters::argon(),
                ARGON_MASS,
                args.cutoff,
            )
        }
    };
    if structure.units != units {
        bail!(
            "structure is in {:?} units but the configuration asks for {:?}",
            structure.units,
            units
        );
    }
    Ok(structure)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let started = chrono::Local::now();
    log::info!("hmc_npt started at {}", started.format("%Y-%m-%d %H:%M:%S"));

    let config = load_config(&args)?;
    let structure = load_structure(&args, config.units)?;

    let engine = LennardJonesEngine::new(structure, config.ensemble.timestep)
        .context("failed to set up the Lennard-Jones engine")?;
    let mut sink = FileSink::create(&config.output.directory).with_context(|| {
        format!(
            "failed to create output files in {}",
            config.output.directory.display()
        )
    })?;

    let mut sampler = Sampler::new(
        config.ensemble.clone(),
        CadenceController::from_output(&config.output),
        engine,
        SeededStream::new(config.ensemble.seed),
    )?;

    if args.no_progress {
        for sweep in 1..=config.n_sweeps {
            sampler.sweep(sweep, &mut sink)?;
        }
    } else {
        for sweep in tqdm!(1..=config.n_sweeps, desc = "sweeps") {
            sampler.sweep(sweep, &mut sink)?;
        }
        eprintln!();
    }
    sink.flush().context("failed to flush output files")?;
    sampler.log_summary();

    let elapsed = chrono::Local::now() - started;
    log::info!(
        "wrote output to {} in {} s",
        sink.directory().display(),
        elapsed.num_seconds()
    );
    Ok(())
}

