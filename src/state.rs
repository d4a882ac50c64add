/*
The sampler's record of the last accepted configuration.

Positions, potential energy, box edge and volume in here only ever change when
a move is accepted. The engine holds its own copy during a trial and is
overwritten from this record at the start of the next one.
*/

use nalgebra::Vector3;

use crate::engine::MdEngine;
use crate::error::{finite, SamplerError};

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    type_masses: Vec<f64>,
    atom_types: Vec<usize>,
    atom_ids: Vec<usize>,
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
    /// PE / kT
    pub potential_energy: f64,
    /// KE / kT
    pub kinetic_energy: f64,
    box_length: f64,
    volume: f64,
}

impl SimulationState {
    pub fn new(
        type_masses: Vec<f64>,
        atom_types: Vec<usize>,
        atom_ids: Vec<usize>,
        positions: Vec<Vector3<f64>>,
        box_length: f64,
    ) -> Self {
        let n = positions.len();
        SimulationState {
            type_masses,
            atom_types,
            atom_ids,
            positions,
            velocities: vec![Vector3::zeros(); n],
            potential_energy: 0.0,
            kinetic_energy: 0.0,
            box_length,
            volume: box_length.powi(3),
        }
    }

    /// Read the initial configuration out of the engine. Energies are divided by `kt`.
    pub fn from_engine<E: MdEngine + ?Sized>(engine: &E, kt: f64) -> Result<Self, SamplerError> {
        let n = engine.atom_count();
        let atom_types = engine.atom_types();
        let type_masses = engine.type_masses();
        if atom_types.len() != n || engine.atom_ids().len() != n {
            return Err(SamplerError::Engine(format!(
                "engine reports {n} atoms but {} types and {} ids",
                atom_types.len(),
                engine.atom_ids().len()
            )));
        }
        if let Some(t) = atom_types.iter().find(|t| **t >= type_masses.len()) {
            return Err(SamplerError::Engine(format!("atom type {t} has no mass")));
        }

        let mut state = SimulationState::new(
            type_masses,
            atom_types,
            engine.atom_ids(),
            engine.positions(),
            engine.box_length(),
        );
        state.velocities = engine.velocities();
        state.potential_energy = finite("potential energy", engine.potential_energy())? / kt;
        state.kinetic_energy = finite("kinetic energy", engine.kinetic_energy())? / kt;
        Ok(state)
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    pub fn atom_ids(&self) -> &[usize] {
        &self.atom_ids
    }

    pub fn atom_types(&self) -> &[usize] {
        &self.atom_types
    }

    pub fn mass(&self, atom: usize) -> f64 {
        self.type_masses[self.atom_types[atom]]
    }

    pub fn box_length(&self) -> f64 {
        self.box_length
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Cubic box: the volume is always derived from the edge.
    pub fn set_box_length(&mut self, box_length: f64) {
        self.box_length = box_length;
        self.volume = box_length.powi(3);
    }
}

/// Attempt/accept tallies for both move types, never reset during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcceptanceCounters {
    pub hmc_attempted: u64,
    pub hmc_accepted: u64,
    pub volume_attempted: u64,
    pub volume_accepted: u64,
}

pub fn acceptance_ratio(accepted: u64, attempted: u64) -> f64 {
    if attempted == 0 {
        0.0
    } else {
        accepted as f64 / attempted as f64
    }
}

impl AcceptanceCounters {
    pub fn record_hmc(&mut self, accepted: bool) {
        self.hmc_attempted += 1;
        if accepted {
            self.hmc_accepted += 1;
        }
    }

    pub fn record_volume(&mut self, accepted: bool) {
        self.volume_attempted += 1;
        if accepted {
            self.volume_accepted += 1;
        }
    }

    pub fn hmc_ratio(&self) -> f64 {
        acceptance_ratio(self.hmc_accepted, self.hmc_attempted)
    }

    pub fn volume_ratio(&self) -> f64 {
        acceptance_ratio(self.volume_accepted, self.volume_attempted)
    }
}
