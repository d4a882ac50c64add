/*
Physical constants and the unit conversions the sampler needs.

Everything the Metropolis tests consume is dimensionless: energies are divided
by kT expressed in the engine's own energy unit, and the pressure enters through
a prefactor with units of inverse volume. These factors depend on the unit style
the engine runs in, so they are derived from `UnitSystem` rather than hard coded.
*/

use serde::{Deserialize, Serialize};

pub const BOLTZMANN: f64 = 1.380648520000e-23; // [m^2 kg s^-2 K^-1]
pub const AVOGADRO: f64 = 6.02214090000e23; // [molecules mol^-1]
pub const GAS_CONSTANT: f64 = BOLTZMANN * AVOGADRO / 1000.0; // [kJ mol^-1 K^-1]

pub const KJ_PER_KCAL: f64 = 4.184;
pub const KJ_MOL_PER_EV: f64 = 96.485332;
pub const BAR_PER_ATM: f64 = 1.01325;

/// Converts kB*T into bar A^3.
pub const PRESSURE_CONVERSION: f64 = BOLTZMANN * 1.0e30 * 1.0e-5; // [bar A^3 K^-1]

/// Unit style of the MD engine. Mass is g/mol and distance is angstrom in both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// kcal/mol, fs, atm
    #[default]
    Real,
    /// eV, ps, bar
    Metal,
}

impl UnitSystem {
    /// Thermal energy at `temperature` in the engine energy unit.
    pub fn thermal_energy(&self, temperature: f64) -> f64 {
        let kt_si = GAS_CONSTANT * temperature; // kJ/mol
        match self {
            UnitSystem::Real => kt_si / KJ_PER_KCAL,
            UnitSystem::Metal => kt_si / KJ_MOL_PER_EV,
        }
    }

    /// kT/m numerator for velocity sampling, in A^2 time^-2 (g/mol).
    pub fn velocity_prefactor(&self, temperature: f64) -> f64 {
        match self {
            UnitSystem::Real => 1e-4 * GAS_CONSTANT * temperature,
            UnitSystem::Metal => 1e2 * GAS_CONSTANT * temperature,
        }
    }

    pub fn pressure_to_bar(&self, pressure: f64) -> f64 {
        match self {
            UnitSystem::Real => pressure * BAR_PER_ATM,
            UnitSystem::Metal => pressure,
        }
    }

    /// mass * velocity^2 -> energy
    pub fn mvv2e(&self) -> f64 {
        match self {
            UnitSystem::Real => 48.88821291 * 48.88821291,
            UnitSystem::Metal => 1.0364269e-4,
        }
    }

    /// force / mass -> acceleration
    pub fn ftm2v(&self) -> f64 {
        1.0 / self.mvv2e()
    }

    /// energy / volume -> pressure
    pub fn nktv2p(&self) -> f64 {
        match self {
            UnitSystem::Real => 68568.415,
            UnitSystem::Metal => 1.6021765e6,
        }
    }
}

/// Quantities fixed by the ensemble, computed once before sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedConstants {
    /// kT in the engine energy unit
    pub kt: f64,
    pub velocity_prefactor: f64,
    /// P / kT in A^-3, multiplies the volume change in the volume move
    pub pressure_prefactor: f64,
}

impl DerivedConstants {
    pub fn new(temperature: f64, pressure: f64, units: UnitSystem) -> Self {
        let pressure_bar = units.pressure_to_bar(pressure);
        DerivedConstants {
            kt: units.thermal_energy(temperature),
            velocity_prefactor: units.velocity_prefactor(temperature),
            pressure_prefactor: pressure_bar / (PRESSURE_CONVERSION * temperature),
        }
    }
}
