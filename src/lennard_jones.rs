/*
Lennard-Jones point particle engine

This is the MD side of the sampler: a truncated, Lorentz-Berthelot mixed
Lennard-Jones fluid in a periodic cubic box, integrated with velocity Verlet.
The sampler only talks to it through `MdEngine`, so it can be swapped for any
other engine that implements the trait.

Units follow `UnitSystem` (real by default): the box origin sits at zero,
positions are wrapped into [0, L) and distances use the minimum image
convention, which requires the cutoff to stay below L/2.
*/

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::UnitSystem;
use crate::engine::{check_len, MdEngine};
use crate::error::SamplerError;
use crate::lj_parameters::{lennard_jones_force, lennard_jones_potential, LJParameters};

/// One atom as stored in a structure or restart file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    pub id: usize,
    pub atom_type: usize,
    pub position: Vector3<f64>,
    #[serde(default = "zero_velocity")]
    pub velocity: Vector3<f64>,
}

fn zero_velocity() -> Vector3<f64> {
    Vector3::zeros()
}

/// Topology plus coordinates. Restart snapshots use the same layout, so a
/// snapshot can be fed straight back in as a structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub units: UnitSystem,
    pub box_length: f64,
    pub cutoff: f64,
    pub type_masses: Vec<f64>,
    pub type_parameters: Vec<LJParameters>,
    pub atoms: Vec<AtomRecord>,
}

impl Structure {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SamplerError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SamplerError::io(path, source))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SamplerError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Single species on an fcc lattice of `cells`^3 unit cells.
    pub fn fcc_lattice(
        cells: usize,
        lattice_constant: f64,
        parameters: LJParameters,
        mass: f64,
        cutoff: f64,
    ) -> Self {
        let basis = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.5, 0.5, 0.0),
            Vector3::new(0.5, 0.0, 0.5),
            Vector3::new(0.0, 0.5, 0.5),
        ];
        let mut atoms = Vec::with_capacity(4 * cells * cells * cells);
        for ix in 0..cells {
            for iy in 0..cells {
                for iz in 0..cells {
                    let corner = Vector3::new(ix as f64, iy as f64, iz as f64);
                    for b in &basis {
                        atoms.push(AtomRecord {
                            id: atoms.len() + 1,
                            atom_type: 0,
                            position: (corner + b) * lattice_constant,
                            velocity: Vector3::zeros(),
                        });
                    }
                }
            }
        }
        Structure {
            units: UnitSystem::Real,
            box_length: cells as f64 * lattice_constant,
            cutoff,
            type_masses: vec![mass],
            type_parameters: vec![parameters],
            atoms,
        }
    }
}

pub fn minimum_image_convention(rij: Vector3<f64>, box_length: f64) -> Vector3<f64> {
    Vector3::new(
        rij[0] - box_length * (rij[0] / box_length).round(),
        rij[1] - box_length * (rij[1] / box_length).round(),
        rij[2] - box_length * (rij[2] / box_length).round(),
    )
}

#[derive(Clone, Debug)]
pub struct LennardJonesEngine {
    units: UnitSystem,
    box_length: f64,
    cutoff: f64,
    timestep: f64,
    type_masses: Vec<f64>,
    // mixed parameters, pair_parameters[ti][tj]
    pair_parameters: Vec<Vec<LJParameters>>,
    type_parameters: Vec<LJParameters>,
    ids: Vec<usize>,
    types: Vec<usize>,
    positions: Vec<Vector3<f64>>,
    velocities: Vec<Vector3<f64>>,
    forces: Vec<Vector3<f64>>,
    potential_energy: f64,
    virial: f64,
}

impl LennardJonesEngine {
    pub fn new(structure: Structure, timestep: f64) -> Result<Self, SamplerError> {
        let n_types = structure.type_masses.len();
        if n_types == 0 || structure.type_parameters.len() != n_types {
            return Err(SamplerError::Engine(format!(
                "{} masses but {} LJ parameter sets",
                n_types,
                structure.type_parameters.len()
            )));
        }
        if let Some(m) = structure.type_masses.iter().find(|m| !(**m > 0.0)) {
            return Err(SamplerError::Engine(format!("non-positive mass {m}")));
        }
        if let Some(atom) = structure.atoms.iter().find(|a| a.atom_type >= n_types) {
            return Err(SamplerError::Engine(format!(
                "atom {} has type {} but only {} types are defined",
                atom.id, atom.atom_type, n_types
            )));
        }
        if !(structure.box_length > 0.0) || !(structure.cutoff > 0.0) {
            return Err(SamplerError::Engine(
                "box length and cutoff must be positive".to_string(),
            ));
        }
        if structure.cutoff > 0.5 * structure.box_length {
            return Err(SamplerError::Engine(format!(
                "cutoff {} exceeds half the box length {}",
                structure.cutoff, structure.box_length
            )));
        }

        let pair_parameters = structure
            .type_parameters
            .iter()
            .map(|a| structure.type_parameters.iter().map(|b| a.mix(b)).collect())
            .collect();

        let n = structure.atoms.len();
        let mut engine = LennardJonesEngine {
            units: structure.units,
            box_length: structure.box_length,
            cutoff: structure.cutoff,
            timestep,
            type_masses: structure.type_masses,
            pair_parameters,
            type_parameters: structure.type_parameters,
            ids: structure.atoms.iter().map(|a| a.id).collect(),
            types: structure.atoms.iter().map(|a| a.atom_type).collect(),
            positions: structure.atoms.iter().map(|a| a.position).collect(),
            velocities: structure.atoms.iter().map(|a| a.velocity).collect(),
            forces: vec![Vector3::zeros(); n],
            potential_energy: 0.0,
            virial: 0.0,
        };
        engine.pbc_update();
        engine.compute_forces();
        log::debug!(
            "Lennard-Jones engine: {} atoms, {} types, box {:.4}, cutoff {:.4}",
            n,
            n_types,
            engine.box_length,
            engine.cutoff
        );
        Ok(engine)
    }

    pub fn from_file(path: impl AsRef<Path>, timestep: f64) -> Result<Self, SamplerError> {
        Self::new(Structure::from_file(path)?, timestep)
    }

    pub fn to_structure(&self) -> Structure {
        let atoms = (0..self.positions.len())
            .map(|i| AtomRecord {
                id: self.ids[i],
                atom_type: self.types[i],
                position: self.positions[i],
                velocity: self.velocities[i],
            })
            .collect();
        Structure {
            units: self.units,
            box_length: self.box_length,
            cutoff: self.cutoff,
            type_masses: self.type_masses.clone(),
            type_parameters: self.type_parameters.clone(),
            atoms,
        }
    }

    fn mass(&self, i: usize) -> f64 {
        self.type_masses[self.types[i]]
    }

    fn pbc_update(&mut self) {
        let box_length = self.box_length;
        for position in self.positions.iter_mut() {
            for k in 0..3 {
                position[k] = position[k].rem_euclid(box_length);
            }
        }
    }

    fn compute_forces(&mut self) {
        /*
        Pair loop over all distinct pairs inside the cutoff. Accumulates the
        potential energy and the pair virial sum r_ij . f_ij alongside the forces.
         */
        let n = self.positions.len();
        let rc2 = self.cutoff * self.cutoff;
        for f in self.forces.iter_mut() {
            *f = Vector3::zeros();
        }
        let mut energy = 0.0;
        let mut virial = 0.0;

        for i in 0..n {
            for j in (i + 1)..n {
                let d = minimum_image_convention(
                    self.positions[j] - self.positions[i],
                    self.box_length,
                );
                let r2 = d.norm_squared();
                if r2 > rc2 {
                    continue;
                }
                let r = r2.sqrt();
                let p = self.pair_parameters[self.types[i]][self.types[j]];
                energy += lennard_jones_potential(r, p.sigma, p.epsilon);

                let f_mag = lennard_jones_force(r, p.sigma, p.epsilon);
                if r > 0.0 {
                    let f_vec = d * (f_mag / r);
                    self.forces[j] += f_vec;
                    self.forces[i] -= f_vec;
                }
                virial += f_mag * r;
            }
        }
        self.potential_energy = energy;
        self.virial = virial;
    }

    fn verlet_step(&mut self) {
        let dt = self.timestep;
        let ftm2v = self.units.ftm2v();

        for i in 0..self.positions.len() {
            let a = self.forces[i] * (ftm2v / self.mass(i));
            self.velocities[i] += 0.5 * dt * a;
            self.positions[i] += dt * self.velocities[i];
        }
        self.pbc_update();
        self.compute_forces();
        for i in 0..self.positions.len() {
            let a = self.forces[i] * (ftm2v / self.mass(i));
            self.velocities[i] += 0.5 * dt * a;
        }
    }
}

impl MdEngine for LennardJonesEngine {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn atom_count(&self) -> usize {
        self.positions.len()
    }

    fn type_masses(&self) -> Vec<f64> {
        self.type_masses.clone()
    }

    fn atom_ids(&self) -> Vec<usize> {
        self.ids.clone()
    }

    fn atom_types(&self) -> Vec<usize> {
        self.types.clone()
    }

    fn positions(&self) -> Vec<Vector3<f64>> {
        self.positions.clone()
    }

    fn set_positions(&mut self, positions: &[Vector3<f64>]) -> Result<(), SamplerError> {
        check_len("position", self.positions.len(), positions.len())?;
        self.positions.copy_from_slice(positions);
        self.pbc_update();
        Ok(())
    }

    fn velocities(&self) -> Vec<Vector3<f64>> {
        self.velocities.clone()
    }

    fn set_velocities(&mut self, velocities: &[Vector3<f64>]) -> Result<(), SamplerError> {
        check_len("velocity", self.velocities.len(), velocities.len())?;
        self.velocities.copy_from_slice(velocities);
        Ok(())
    }

    fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    fn kinetic_energy(&self) -> f64 {
        let mut kinetic_energy = 0.0;
        for (i, v) in self.velocities.iter().enumerate() {
            kinetic_energy += 0.5 * self.mass(i) * v.norm_squared();
        }
        kinetic_energy * self.units.mvv2e()
    }

    fn virial_pressure(&self) -> f64 {
        let volume = self.box_length.powi(3);
        (2.0 * self.kinetic_energy() + self.virial) / (3.0 * volume) * self.units.nktv2p()
    }

    fn box_length(&self) -> f64 {
        self.box_length
    }

    fn set_box_length(&mut self, length: f64) -> Result<(), SamplerError> {
        if !(length.is_finite() && length > 0.0) {
            return Err(SamplerError::Engine(format!("invalid box length {length}")));
        }
        // single image pair loop: past this point energies would silently miss images
        if self.cutoff > 0.5 * length {
            return Err(SamplerError::Engine(format!(
                "box length {length} is below twice the cutoff {}",
                self.cutoff
            )));
        }
        self.box_length = length;
        Ok(())
    }

    fn set_timestep(&mut self, dt: f64) {
        self.timestep = dt;
    }

    fn run(&mut self, n_steps: usize) -> Result<(), SamplerError> {
        self.compute_forces();
        for _ in 0..n_steps {
            self.verlet_step();
        }
        log::trace!(
            "ran {n_steps} steps, pe = {:.6}, ke = {:.6}",
            self.potential_energy,
            self.kinetic_energy()
        );
        Ok(())
    }

    fn write_restart(&self, path: &Path) -> Result<(), SamplerError> {
        let file = File::create(path).map_err(|source| SamplerError::io(path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.to_structure()).map_err(|source| {
            SamplerError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(|source| SamplerError::io(path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lj_parameters::ARGON_MASS;
    use approx::assert_relative_eq;

    fn argon_crystal(cells: usize, cutoff: f64) -> LennardJonesEngine {
        let structure = Structure::fcc_lattice(cells, 5.26, LJParameters::argon(), ARGON_MASS, cutoff);
        LennardJonesEngine::new(structure, 5.0).unwrap()
    }

    fn two_atoms(separation: f64) -> Structure {
        Structure {
            units: UnitSystem::Real,
            box_length: 30.0,
            cutoff: 10.0,
            type_masses: vec![ARGON_MASS],
            type_parameters: vec![LJParameters::argon()],
            atoms: vec![
                AtomRecord {
                    id: 1,
                    atom_type: 0,
                    position: Vector3::new(5.0, 5.0, 5.0),
                    velocity: Vector3::zeros(),
                },
                AtomRecord {
                    id: 2,
                    atom_type: 0,
                    position: Vector3::new(5.0 + separation, 5.0, 5.0),
                    velocity: Vector3::zeros(),
                },
            ],
        }
    }

    #[test]
    fn fcc_lattice_is_bound() {
        let engine = argon_crystal(3, 7.85);
        assert_eq!(engine.atom_count(), 108);
        assert_eq!(engine.atom_ids()[0], 1);
        assert_eq!(engine.atom_ids()[107], 108);
        assert!(engine.potential_energy() < 0.0);
        // each atom has 12 nearest neighbours near the LJ minimum
        let per_atom = engine.potential_energy() / 108.0;
        assert!(per_atom < -1.0 && per_atom > -2.0, "per atom energy {per_atom}");
    }

    #[test]
    fn pair_energy_matches_kernel() {
        let engine = LennardJonesEngine::new(two_atoms(3.8), 1.0).unwrap();
        assert_relative_eq!(
            engine.potential_energy(),
            lennard_jones_potential(3.8, 3.405, 0.238),
            max_relative = 1e-12
        );
    }

    #[test]
    fn minimum_image_sees_neighbours_across_the_boundary() {
        let mut structure = two_atoms(0.0);
        structure.atoms[0].position = Vector3::new(0.5, 5.0, 5.0);
        structure.atoms[1].position = Vector3::new(29.5 - 3.0, 5.0, 5.0);
        let engine = LennardJonesEngine::new(structure, 1.0).unwrap();
        assert_relative_eq!(
            engine.potential_energy(),
            lennard_jones_potential(4.0, 3.405, 0.238),
            max_relative = 1e-9
        );
    }

    #[test]
    fn kinetic_energy_in_real_units() {
        let mut structure = two_atoms(20.0);
        structure.atoms[0].velocity = Vector3::new(0.01, 0.0, 0.0);
        let engine = LennardJonesEngine::new(structure, 1.0).unwrap();
        let expected = 0.5 * ARGON_MASS * 1e-4 * UnitSystem::Real.mvv2e();
        assert_relative_eq!(engine.kinetic_energy(), expected, max_relative = 1e-12);
        assert_relative_eq!(engine.kinetic_energy(), 4.7739, max_relative = 1e-4);
    }

    #[test]
    fn non_interacting_atoms_give_ideal_gas_pressure() {
        let mut structure = two_atoms(12.0);
        structure.atoms[0].velocity = Vector3::new(0.002, -0.001, 0.0);
        structure.atoms[1].velocity = Vector3::new(0.0, 0.003, 0.001);
        let engine = LennardJonesEngine::new(structure, 1.0).unwrap();
        let volume = 30.0f64.powi(3);
        let expected = 2.0 * engine.kinetic_energy() / (3.0 * volume) * UnitSystem::Real.nktv2p();
        assert_relative_eq!(engine.virial_pressure(), expected, max_relative = 1e-12);
    }

    #[test]
    fn velocity_verlet_conserves_energy() {
        let mut engine = argon_crystal(3, 7.85);
        let mut positions = engine.positions();
        positions[0] += Vector3::new(0.2, -0.1, 0.15);
        engine.set_positions(&positions).unwrap();
        engine.run(0).unwrap();

        let e0 = engine.potential_energy() + engine.kinetic_energy();
        engine.run(200).unwrap();
        let e1 = engine.potential_energy() + engine.kinetic_energy();

        assert!(engine.kinetic_energy() > 0.0);
        assert!((e1 - e0).abs() < 1e-3 * e0.abs(), "drift {}", e1 - e0);
    }

    #[test]
    fn positions_are_wrapped_into_the_box() {
        let mut engine = LennardJonesEngine::new(two_atoms(4.0), 1.0).unwrap();
        engine
            .set_positions(&[Vector3::new(-1.0, 31.0, 5.0), Vector3::new(9.0, 5.0, 5.0)])
            .unwrap();
        let p = engine.positions();
        assert_relative_eq!(p[0].x, 29.0, max_relative = 1e-12);
        assert_relative_eq!(p[0].y, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn rejects_bad_input() {
        let mut engine = LennardJonesEngine::new(two_atoms(4.0), 1.0).unwrap();
        assert!(engine.set_box_length(0.0).is_err());
        assert!(engine.set_box_length(f64::NAN).is_err());
        assert!(engine.set_positions(&[Vector3::zeros()]).is_err());

        let mut structure = two_atoms(4.0);
        structure.cutoff = 20.0;
        assert!(LennardJonesEngine::new(structure, 1.0).is_err());

        let mut structure = two_atoms(4.0);
        structure.atoms[1].atom_type = 3;
        assert!(LennardJonesEngine::new(structure, 1.0).is_err());
    }

    #[test]
    fn box_cannot_shrink_below_twice_the_cutoff() {
        let mut engine = LennardJonesEngine::new(two_atoms(8.5), 1.0).unwrap();

        let err = engine.set_box_length(18.0).expect_err("cutoff 10 needs a box of at least 20");
        assert!(matches!(err, SamplerError::Engine(_)));
        assert_eq!(engine.box_length(), 30.0);

        // the smallest legal box still reloads from its own snapshot
        engine.set_box_length(20.0).unwrap();
        engine.run(0).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restart_b.dat");
        engine.write_restart(&path).unwrap();
        let reloaded = LennardJonesEngine::from_file(&path, 1.0).unwrap();
        assert_eq!(reloaded.box_length(), 20.0);
        assert_relative_eq!(
            reloaded.potential_energy(),
            lennard_jones_potential(8.5, 3.405, 0.238),
            max_relative = 1e-12
        );
    }

    #[test]
    fn restart_snapshot_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restart_a.dat");

        let mut engine = argon_crystal(3, 7.85);
        engine.set_box_length(15.9).unwrap();
        engine.run(3).unwrap();
        engine.write_restart(&path).unwrap();

        let reloaded = LennardJonesEngine::from_file(&path, 5.0).unwrap();
        assert_eq!(reloaded.box_length(), 15.9);
        assert_eq!(reloaded.positions(), engine.positions());
        assert_eq!(reloaded.velocities(), engine.velocities());
        assert_relative_eq!(
            reloaded.potential_energy(),
            engine.potential_energy(),
            max_relative = 1e-12
        );
    }
}
