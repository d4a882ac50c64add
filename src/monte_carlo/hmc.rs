use crate::config::EnsembleParameters;
use crate::constants::DerivedConstants;
use crate::engine::MdEngine;
use crate::error::{finite, SamplerError};
use crate::monte_carlo::metropolis::metropolis_accept;
use crate::monte_carlo::random::RandomStream;
use crate::monte_carlo::velocities::initialize_velocities;
use crate::monte_carlo::{MoveKind, MoveOutcome};
use crate::state::SimulationState;

/// Hybrid Monte Carlo trial: resample momenta, integrate `md_steps` MD steps
/// and accept on the change of total energy.
///
/// On rejection the state is left as it was; the engine's trajectory is simply
/// overwritten by the next trial.
pub fn hmc_move<E, R>(
    engine: &mut E,
    state: &mut SimulationState,
    params: &EnsembleParameters,
    constants: &DerivedConstants,
    rng: &mut R,
) -> Result<MoveOutcome, SamplerError>
where
    E: MdEngine + ?Sized,
    R: RandomStream + ?Sized,
{
    let kt = constants.kt;

    engine.set_positions(&state.positions)?;

    initialize_velocities(engine, state, constants.velocity_prefactor, rng)?;
    let ke = finite("kinetic energy", engine.kinetic_energy())? / kt;
    let etot = state.potential_energy + ke;

    engine.run(params.md_steps)?;

    let pe_new = finite("potential energy", engine.potential_energy())? / kt;
    let ke_new = finite("kinetic energy", engine.kinetic_energy())? / kt;
    let etot_new = pe_new + ke_new;

    // dimensionless, kT already divided out
    let delta_h = etot_new - etot;

    let accepted = metropolis_accept(rng.uniform(), delta_h);
    if accepted {
        state.potential_energy = pe_new;
        state.kinetic_energy = ke_new;
        state.positions = engine.positions();
    }
    log::debug!("hmc move: dH = {delta_h:.6}, accepted = {accepted}");

    Ok(MoveOutcome {
        kind: MoveKind::Hmc,
        accepted,
        argument: delta_h,
    })
}
