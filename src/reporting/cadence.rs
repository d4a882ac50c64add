use crate::config::OutputConfig;

/// Which outputs fire after a given sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportEvents {
    pub thermo: bool,
    pub trajectory: bool,
    pub restart_primary: bool,
    pub restart_alternate: bool,
    pub flush: bool,
}

impl ReportEvents {
    pub fn any(&self) -> bool {
        self.thermo || self.trajectory || self.restart_primary || self.restart_alternate || self.flush
    }
}

/// Independent cadences, in sweeps, over the 1-based sweep index. A cadence
/// of zero never fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CadenceController {
    pub freq_thermo: u64,
    pub freq_traj: u64,
    pub freq_restart: u64,
    pub freq_restart_alt: u64,
    pub freq_flush: u64,
}

fn fires(freq: u64, sweep: u64) -> bool {
    freq != 0 && sweep % freq == 0
}

impl CadenceController {
    pub fn from_output(output: &OutputConfig) -> Self {
        CadenceController {
            freq_thermo: output.freq_thermo,
            freq_traj: output.freq_traj,
            freq_restart: output.freq_restart,
            freq_restart_alt: output.restart_alt_cadence(),
            freq_flush: output.freq_flush,
        }
    }

    /// Never reports anything.
    pub fn silent() -> Self {
        CadenceController {
            freq_thermo: 0,
            freq_traj: 0,
            freq_restart: 0,
            freq_restart_alt: 0,
            freq_flush: 0,
        }
    }

    pub fn events(&self, sweep: u64) -> ReportEvents {
        ReportEvents {
            thermo: fires(self.freq_thermo, sweep),
            trajectory: fires(self.freq_traj, sweep),
            restart_primary: fires(self.freq_restart, sweep),
            restart_alternate: fires(self.freq_restart_alt, sweep),
            flush: fires(self.freq_flush, sweep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argon_defaults() -> CadenceController {
        CadenceController::from_output(&OutputConfig::default())
    }

    #[test]
    fn thermo_and_trajectory_cadences() {
        let cadence = argon_defaults();
        let thermo: Vec<u64> = (1..=10_000).filter(|s| cadence.events(*s).thermo).collect();
        let traj: Vec<u64> = (1..=10_000).filter(|s| cadence.events(*s).trajectory).collect();

        assert_eq!(thermo.len(), 200);
        assert_eq!(&thermo[..3], &[50, 100, 150]);
        assert_eq!(traj, vec![5000, 10_000]);

        let both = cadence.events(5000);
        assert!(both.thermo && both.trajectory);
        assert!(!cadence.events(4999).any());
    }

    #[test]
    fn restart_files_alternate() {
        let cadence = argon_defaults();
        assert_eq!(cadence.freq_restart_alt, 2500);

        let at_2500 = cadence.events(2500);
        assert!(at_2500.restart_alternate && !at_2500.restart_primary);

        let at_5000 = cadence.events(5000);
        assert!(at_5000.restart_alternate && at_5000.restart_primary);
    }

    #[test]
    fn first_sweep_fires_nothing_but_unit_cadences() {
        let mut cadence = argon_defaults();
        assert!(!cadence.events(1).any());
        cadence.freq_flush = 1;
        assert_eq!(
            cadence.events(1),
            ReportEvents {
                flush: true,
                ..ReportEvents::default()
            }
        );
    }

    #[test]
    fn zero_cadence_is_disabled() {
        let cadence = CadenceController::silent();
        assert!((1..=1000).all(|s| !cadence.events(s).any()));
    }
}
