/*
Run configuration.

Everything here is fixed at start-up. The defaults reproduce the liquid argon
run at 132 K: 20 million sweeps, 10 MD steps of 30 fs per HMC trial and
p_hmc > 1, i.e. an NVT run. Setting p_hmc below one turns on volume moves.
*/

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::UnitSystem;
use crate::error::SamplerError;

/// Parameters that fix the target distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EnsembleParameters {
    /// [K]
    pub temperature: f64,
    /// In the engine pressure unit (atm for real units)
    pub pressure: f64,
    /// MD steps per HMC trial
    pub md_steps: usize,
    /// In the engine time unit (fs for real units)
    pub timestep: f64,
    /// Probability of selecting the HMC move; >= 1.0 gives NVT
    pub p_hmc: f64,
    /// Maximum log volume displacement
    pub lnvol_max: f64,
    pub seed: u64,
}

impl Default for EnsembleParameters {
    fn default() -> Self {
        EnsembleParameters {
            temperature: 132.0,
            pressure: 29.60770,
            md_steps: 10,
            timestep: 30.0,
            p_hmc: 1.1,
            lnvol_max: 0.04,
            seed: 1234,
        }
    }
}

impl EnsembleParameters {
    pub fn is_nvt(&self) -> bool {
        self.p_hmc >= 1.0
    }

    pub fn validate(&self) -> Result<(), SamplerError> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(SamplerError::config(
                "temperature",
                format!("must be strictly positive, got {}", self.temperature),
            ));
        }
        if !(self.pressure.is_finite() && self.pressure > 0.0) {
            return Err(SamplerError::config(
                "pressure",
                format!("must be strictly positive, got {}", self.pressure),
            ));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(SamplerError::config(
                "timestep",
                format!("must be strictly positive, got {}", self.timestep),
            ));
        }
        if !(self.p_hmc.is_finite() && self.p_hmc >= 0.0) {
            return Err(SamplerError::config(
                "p_hmc",
                format!("must be non-negative, got {}", self.p_hmc),
            ));
        }
        if !(self.lnvol_max.is_finite() && self.lnvol_max >= 0.0) {
            return Err(SamplerError::config(
                "lnvol_max",
                format!("must be non-negative, got {}", self.lnvol_max),
            ));
        }
        Ok(())
    }
}

/// Output cadences in sweeps. Zero switches an output off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OutputConfig {
    pub freq_thermo: u64,
    pub freq_traj: u64,
    pub freq_restart: u64,
    /// Cadence of the second restart file; half of `freq_restart` when unset
    pub freq_restart_alt: Option<u64>,
    pub freq_flush: u64,
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            freq_thermo: 50,
            freq_traj: 5000,
            freq_restart: 5000,
            freq_restart_alt: None,
            freq_flush: 500,
            directory: PathBuf::from("."),
        }
    }
}

impl OutputConfig {
    /// Explicit value if set, otherwise half the primary cadence. An enabled
    /// primary restart never leaves the alternate one switched off.
    pub fn restart_alt_cadence(&self) -> u64 {
        match self.freq_restart_alt {
            Some(freq) => freq,
            None if self.freq_restart == 0 => 0,
            None => (self.freq_restart / 2).max(1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunConfig {
    pub n_sweeps: u64,
    pub units: UnitSystem,
    pub ensemble: EnsembleParameters,
    pub output: OutputConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            n_sweeps: 20_000_000,
            units: UnitSystem::Real,
            ensemble: EnsembleParameters::default(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SamplerError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SamplerError::io(path, source))?;
        serde_json::from_str(&text).map_err(|source| SamplerError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.n_sweeps == 0 {
            return Err(SamplerError::config("n_sweeps", "must be at least one sweep"));
        }
        self.ensemble.validate()?;

        if self.ensemble.is_nvt() && self.ensemble.lnvol_max > 0.0 {
            log::warn!(
                "p_hmc = {} selects NVT; lnvol_max = {} will never be used",
                self.ensemble.p_hmc,
                self.ensemble.lnvol_max
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_argon_run() {
        let config = RunConfig::default();
        assert_eq!(config.n_sweeps, 20_000_000);
        assert_eq!(config.ensemble.md_steps, 10);
        assert_eq!(config.ensemble.seed, 1234);
        assert!(config.ensemble.is_nvt());
        assert_eq!(config.output.restart_alt_cadence(), 2500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "n_sweeps": 100, "ensemble": { "p_hmc": 0.9 }, "output": { "freq_restart": 400 } }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.n_sweeps, 100);
        assert_eq!(config.ensemble.p_hmc, 0.9);
        assert_eq!(config.ensemble.temperature, 132.0);
        assert_eq!(config.output.freq_thermo, 50);
        assert_eq!(config.output.restart_alt_cadence(), 200);
        assert!(!config.ensemble.is_nvt());
    }

    #[test]
    fn alternate_restart_stays_on_for_tiny_cadences() {
        let mut output = OutputConfig {
            freq_restart: 1,
            ..OutputConfig::default()
        };
        assert_eq!(output.restart_alt_cadence(), 1);

        output.freq_restart = 3;
        assert_eq!(output.restart_alt_cadence(), 1);

        output.freq_restart = 0;
        assert_eq!(output.restart_alt_cadence(), 0);

        output.freq_restart_alt = Some(7);
        assert_eq!(output.restart_alt_cadence(), 7);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{ "ensemble": { "temprature": 300.0 } }"#;
        assert!(serde_json::from_str::<RunConfig>(json).is_err());
    }

    #[test]
    fn units_parse_lowercase() {
        let config: RunConfig = serde_json::from_str(r#"{ "units": "metal" }"#).unwrap();
        assert_eq!(config.units, UnitSystem::Metal);
    }

    #[test]
    fn rejects_non_positive_temperature_and_pressure() {
        let mut config = RunConfig::default();
        config.ensemble.temperature = 0.0;
        let err = config.validate().expect_err("zero temperature is invalid");
        assert!(err.to_string().contains("temperature"));

        let mut config = RunConfig::default();
        config.ensemble.pressure = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_sweeps_and_negative_steps() {
        let mut config = RunConfig::default();
        config.n_sweeps = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.ensemble.lnvol_max = -0.1;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.ensemble.p_hmc = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "n_sweeps": 10, "ensemble": { "seed": 7 } }"#).unwrap();

        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.n_sweeps, 10);
        assert_eq!(config.ensemble.seed, 7);

        let missing = RunConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SamplerError::Io { .. })));
    }
}
