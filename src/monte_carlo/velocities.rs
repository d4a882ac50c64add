use nalgebra::Vector3;

use crate::engine::MdEngine;
use crate::error::SamplerError;
use crate::monte_carlo::random::RandomStream;
use crate::state::SimulationState;

pub fn initialize_velocities<E, R>(
    engine: &mut E,
    state: &mut SimulationState,
    velocity_prefactor: f64,
    rng: &mut R,
) -> Result<(), SamplerError>
where
    E: MdEngine + ?Sized,
    R: RandomStream + ?Sized,
{
    /*
    Fresh Maxwell-Boltzmann momenta for every trial.

    Each component is drawn independently with sigma = sqrt(kT/m), atoms in index
    order and x, y, z within an atom. The engine then needs a zero length run so
    its kinetic energy reflects the new velocities.

    Point particles only - rigid bodies would need their rotational degrees of
    freedom drawn as well.
     */
    for i in 0..state.atom_count() {
        let sigma = (velocity_prefactor / state.mass(i)).sqrt();
        let vx = sigma * rng.standard_normal();
        let vy = sigma * rng.standard_normal();
        let vz = sigma * rng.standard_normal();
        state.velocities[i] = Vector3::new(vx, vy, vz);
    }
    engine.set_velocities(&state.velocities)?;
    engine.run(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{flat, MockEngine};
    use crate::monte_carlo::random::{ScriptedStream, SeededStream};

    fn two_species() -> (MockEngine, SimulationState) {
        let mut engine = MockEngine::new(vec![Vector3::zeros(); 2], 10.0, flat);
        engine.type_masses = vec![1.0, 4.0];
        engine.types = vec![0, 1];
        let state = SimulationState::from_engine(&engine, 1.0).unwrap();
        (engine, state)
    }

    #[test]
    fn sigma_scales_with_inverse_root_mass() {
        let (mut engine, mut state) = two_species();
        let mut rng = ScriptedStream::new(&[], &[1.0, 2.0, 3.0, -1.0, -2.0, -3.0]);

        initialize_velocities(&mut engine, &mut state, 4.0, &mut rng).unwrap();

        assert_eq!(state.velocities[0], Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(state.velocities[1], Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(engine.velocities, state.velocities);
        assert_eq!(engine.runs, vec![0]);
        assert!(rng.normals.is_empty());
    }

    #[test]
    fn kinetic_energy_matches_equipartition() {
        let n = 4000;
        let mut engine = MockEngine::new(vec![Vector3::zeros(); n], 50.0, flat);
        engine.type_masses = vec![39.948];
        let mut state = SimulationState::from_engine(&engine, 1.0).unwrap();
        let mut rng = SeededStream::new(2024);

        let constants = crate::constants::DerivedConstants::new(
            132.0,
            1.0,
            crate::constants::UnitSystem::Real,
        );
        initialize_velocities(&mut engine, &mut state, constants.velocity_prefactor, &mut rng)
            .unwrap();

        // <KE> = 3/2 N kT
        let ke_per_dof = engine.kinetic_energy() / (3.0 * n as f64) / constants.kt;
        assert!((ke_per_dof - 0.5).abs() < 0.025, "KE per dof {ke_per_dof}");
    }
}
