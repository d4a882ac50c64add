/*
The MD engine as seen by the sampler.

The sampler never integrates equations of motion or evaluates a force field.
It pushes coordinates and velocities into an engine, asks it to advance, and
reads back energies. Any engine that can do the operations below can drive
the sampler, including a deterministic mock in tests.

Derived quantities (energies, pressure) are only guaranteed to match the
current positions/velocities/box after `run`, which is why the sampler issues
`run(0)` after every push.
*/

use std::path::Path;

use nalgebra::Vector3;

use crate::constants::UnitSystem;
use crate::error::SamplerError;

pub trait MdEngine {
    fn units(&self) -> UnitSystem;

    fn atom_count(&self) -> usize;

    /// Mass per atom type, indexed by type.
    fn type_masses(&self) -> Vec<f64>;

    fn atom_ids(&self) -> Vec<usize>;

    fn atom_types(&self) -> Vec<usize>;

    /// Positions ordered by the stable per-atom index.
    fn positions(&self) -> Vec<Vector3<f64>>;

    fn set_positions(&mut self, positions: &[Vector3<f64>]) -> Result<(), SamplerError>;

    fn velocities(&self) -> Vec<Vector3<f64>>;

    fn set_velocities(&mut self, velocities: &[Vector3<f64>]) -> Result<(), SamplerError>;

    /// In the engine energy unit.
    fn potential_energy(&self) -> f64;

    fn kinetic_energy(&self) -> f64;

    /// In the engine pressure unit.
    fn virial_pressure(&self) -> f64;

    /// Edge of the cubic box.
    fn box_length(&self) -> f64;

    /// Isotropic resize to `length`^3. Atoms are not moved.
    fn set_box_length(&mut self, length: f64) -> Result<(), SamplerError>;

    fn set_timestep(&mut self, dt: f64);

    /// Advance `n_steps` steps. `run(0)` only refreshes derived quantities.
    fn run(&mut self, n_steps: usize) -> Result<(), SamplerError>;

    /// Persist the current state in a format the engine can read back.
    fn write_restart(&self, path: &Path) -> Result<(), SamplerError>;
}

pub(crate) fn check_len(what: &str, expected: usize, got: usize) -> Result<(), SamplerError> {
    if expected == got {
        Ok(())
    } else {
        Err(SamplerError::Engine(format!(
            "{what} array has {got} entries, expected {expected}"
        )))
    }
}
