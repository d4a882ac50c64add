/*

=========================================================
 Hybrid Monte Carlo sampler for the NVT / NPT ensembles
=========================================================

🎲 Move Scheduler
-----------------
Every sweep draws one uniform number r:
    r <= p_hmc  -> hybrid Monte Carlo (HMC) move
    otherwise   -> isotropic log-volume move

⚛️ HMC Move
-----------
- Momenta resampled from Maxwell-Boltzmann at temperature T:
    v ~ N(0, kT / m) per Cartesian component
- md_steps of velocity Verlet from the last accepted positions
- Accepted with probability min(1, exp(-dH)), dH = ΔE_total / kT

📦 Volume Move
--------------
- ln V' = ln V + (u - 0.5) * lnvol_max
- Coordinates scaled affinely with the box edge
- arg = ΔU/kT + P ΔV/kT - (N + 1) ln(V'/V)
- lnvol_max = 0 turns the run into an NVT sampler

🔌 MD Engine
------------
The force evaluation and integration live behind the `MdEngine` trait. A
Lennard-Jones engine (velocity Verlet, cubic PBC, minimum image, cutoff) is
provided so the sampler runs out of the box.

📝 Output
---------
thermo.dat, traj.dat and two alternating restart files, each on its own cadence
in sweeps.

=========================================================
*/

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod lennard_jones;
pub mod lj_parameters;
pub mod monte_carlo;
pub mod reporting;
pub mod state;

pub use config::{EnsembleParameters, OutputConfig, RunConfig};
pub use constants::{DerivedConstants, UnitSystem};
pub use engine::MdEngine;
pub use error::SamplerError;
pub use lennard_jones::{LennardJonesEngine, Structure};
pub use monte_carlo::random::{RandomStream, SeededStream};
pub use monte_carlo::sampler::Sampler;
pub use monte_carlo::{MoveKind, MoveOutcome};
pub use reporting::cadence::CadenceController;
pub use reporting::sink::{FileSink, MemorySink, ReportSink};
pub use state::{AcceptanceCounters, SimulationState};
