/*
Isotropic volume move for the NPT ensemble.

The trial is generated in ln(V): ln V' = ln V + (u - 0.5) * lnvol_max. Sampling
uniformly in ln V instead of V changes the measure, which together with the N
scaled coordinates gives the (N + 1) ln(V'/V) term in the acceptance argument.

    arg = (U' - U)/kT + P (V' - V)/kT - (N + 1) ln(V'/V)

The box edge is computed first and the volume derived from it, so an accepted
state always has V = L^3 exactly.
*/

use crate::config::EnsembleParameters;
use crate::constants::DerivedConstants;
use crate::engine::MdEngine;
use crate::error::{finite, SamplerError};
use crate::monte_carlo::metropolis::metropolis_accept;
use crate::monte_carlo::random::RandomStream;
use crate::monte_carlo::{MoveKind, MoveOutcome};
use crate::state::SimulationState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeProposal {
    pub box_length: f64,
    pub volume: f64,
}

pub fn propose_volume(volume: f64, lnvol_max: f64, u: f64) -> VolumeProposal {
    let ln_volume = volume.ln() + (u - 0.5) * lnvol_max;
    let box_length = ln_volume.exp().cbrt();
    VolumeProposal {
        box_length,
        volume: box_length.powi(3),
    }
}

/// Metropolis argument for a volume change. Energies are in units of kT and
/// `pressure_prefactor` is P/kT.
pub fn volume_argument(
    pe_old: f64,
    pe_new: f64,
    volume_old: f64,
    volume_new: f64,
    pressure_prefactor: f64,
    n_atoms: usize,
) -> f64 {
    (pe_new - pe_old) + pressure_prefactor * (volume_new - volume_old)
        - (n_atoms as f64 + 1.0) * (volume_new / volume_old).ln()
}

pub fn volume_move<E, R>(
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
    engine.set_positions(&state.positions)?;

    let proposal = propose_volume(state.volume(), params.lnvol_max, rng.uniform());
    engine.set_box_length(proposal.box_length)?;

    let scale = proposal.box_length / state.box_length();
    let scaled: Vec<_> = state.positions.iter().map(|x| x * scale).collect();
    engine.set_positions(&scaled)?;
    engine.run(0)?;

    let pe_new = finite("potential energy", engine.potential_energy())? / constants.kt;
    let volume_old = state.volume();

    let argument = volume_argument(
        state.potential_energy,
        pe_new,
        volume_old,
        proposal.volume,
        constants.pressure_prefactor,
        state.atom_count(),
    );

    let accepted = metropolis_accept(rng.uniform(), argument);
    if accepted {
        state.potential_energy = pe_new;
        state.set_box_length(proposal.box_length);
        state.positions = scaled;
    } else {
        // positions in the state were never touched; only the box needs reverting
        engine.set_box_length(state.box_length())?;
    }
    log::debug!(
        "volume move: V {volume_old:.4} -> {:.4}, arg = {argument:.6}, accepted = {accepted}",
        proposal.volume
    );

    Ok(MoveOutcome {
        kind: MoveKind::Volume,
        accepted,
        argument,
    })
}
