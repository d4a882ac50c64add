/*
The sweep loop.

    for sweep in 1..=n_sweeps
        r = uniform()
        r <= p_hmc  ->  HMC move
        otherwise   ->  volume move
        report whatever the cadence says is due

Sweeps run strictly one after another since each acceptance test depends on the
state committed by the previous sweep. The scheduler draw always comes before
any draw made inside a move, which keeps the random stream, and therefore the
whole run, reproducible from the seed.
*/

use crate::config::EnsembleParameters;
use crate::constants::DerivedConstants;
use crate::engine::MdEngine;
use crate::error::{finite, SamplerError};
use crate::monte_carlo::hmc::hmc_move;
use crate::monte_carlo::random::RandomStream;
use crate::monte_carlo::volume::volume_move;
use crate::monte_carlo::{MoveKind, MoveOutcome};
use crate::reporting::cadence::CadenceController;
use crate::reporting::sink::{ReportSink, RestartSlot, ThermoRecord, TrajectoryFrame};
use crate::state::{AcceptanceCounters, SimulationState};

pub struct Sampler<E: MdEngine, R: RandomStream> {
    params: EnsembleParameters,
    constants: DerivedConstants,
    cadence: CadenceController,
    engine: E,
    rng: R,
    state: SimulationState,
    counters: AcceptanceCounters,
    last_delta_h: f64,
}

impl<E: MdEngine, R: RandomStream> Sampler<E, R> {
    pub fn new(
        params: EnsembleParameters,
        cadence: CadenceController,
        mut engine: E,
        rng: R,
    ) -> Result<Self, SamplerError> {
        params.validate()?;
        let constants = DerivedConstants::new(params.temperature, params.pressure, engine.units());

        engine.set_timestep(params.timestep);
        engine.run(0)?;
        let state = SimulationState::from_engine(&engine, constants.kt)?;

        log::info!(
            "{} sampler: {} atoms, T = {} K, P = {}, box = {:.6}, p_hmc = {}, lnvol_max = {}",
            if params.is_nvt() { "NVT" } else { "NPT" },
            state.atom_count(),
            params.temperature,
            params.pressure,
            state.box_length(),
            params.p_hmc,
            params.lnvol_max
        );
        log::info!(
            "kT = {:.8} ({:?} units), velocity prefactor = {:.8e}, pressure prefactor = {:.8e}",
            constants.kt,
            engine.units(),
            constants.velocity_prefactor,
            constants.pressure_prefactor
        );

        Ok(Sampler {
            params,
            constants,
            cadence,
            engine,
            rng,
            state,
            counters: AcceptanceCounters::default(),
            last_delta_h: 0.0,
        })
    }

    pub fn params(&self) -> &EnsembleParameters {
        &self.params
    }

    pub fn constants(&self) -> &DerivedConstants {
        &self.constants
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn counters(&self) -> &AcceptanceCounters {
        &self.counters
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// dH of the most recent HMC move, zero before the first one.
    pub fn last_delta_h(&self) -> f64 {
        self.last_delta_h
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// One Bernoulli draw: HMC with probability `p_hmc`, volume move otherwise.
    pub fn select_move(&mut self) -> MoveKind {
        if self.rng.uniform() <= self.params.p_hmc {
            MoveKind::Hmc
        } else {
            MoveKind::Volume
        }
    }

    /// Select and perform one move, without any reporting.
    pub fn step(&mut self) -> Result<MoveOutcome, SamplerError> {
        let outcome = match self.select_move() {
            MoveKind::Hmc => {
                let outcome = hmc_move(
                    &mut self.engine,
                    &mut self.state,
                    &self.params,
                    &self.constants,
                    &mut self.rng,
                )?;
                self.counters.record_hmc(outcome.accepted);
                self.last_delta_h = outcome.argument;
                outcome
            }
            MoveKind::Volume => {
                let outcome = volume_move(
                    &mut self.engine,
                    &mut self.state,
                    &self.params,
                    &self.constants,
                    &mut self.rng,
                )?;
                self.counters.record_volume(outcome.accepted);
                outcome
            }
        };
        Ok(outcome)
    }

    /// Sweep number `sweep` (1-based): one move followed by the outputs due.
    pub fn sweep<S: ReportSink + ?Sized>(
        &mut self,
        sweep: u64,
        sink: &mut S,
    ) -> Result<MoveOutcome, SamplerError> {
        let outcome = self.step()?;
        self.report(sweep, sink)?;
        Ok(outcome)
    }

    pub fn run<S: ReportSink + ?Sized>(
        &mut self,
        n_sweeps: u64,
        sink: &mut S,
    ) -> Result<AcceptanceCounters, SamplerError> {
        for sweep in 1..=n_sweeps {
            self.sweep(sweep, sink)?;
        }
        sink.flush()?;
        self.log_summary();
        Ok(self.counters)
    }

    pub fn log_summary(&self) {
        log::info!(
            "finished: {} HMC moves ({:.4} accepted), {} volume moves ({:.4} accepted), final volume {:.6}",
            self.counters.hmc_attempted,
            self.counters.hmc_ratio(),
            self.counters.volume_attempted,
            self.counters.volume_ratio(),
            self.state.volume()
        );
    }

    /// Push the last accepted configuration into the engine so pressure and
    /// restart snapshots describe it rather than a discarded trial.
    fn sync_engine(&mut self) -> Result<(), SamplerError> {
        self.engine.set_positions(&self.state.positions)?;
        self.engine.run(0)
    }

    pub fn report<S: ReportSink + ?Sized>(&mut self, sweep: u64, sink: &mut S) -> Result<(), SamplerError> {
        let events = self.cadence.events(sweep);
        if !events.any() {
            return Ok(());
        }
        if events.thermo || events.restart_primary || events.restart_alternate {
            self.sync_engine()?;
        }

        if events.thermo {
            let record = ThermoRecord {
                sweep,
                potential_energy: self.constants.kt * self.state.potential_energy,
                virial_pressure: finite("virial pressure", self.engine.virial_pressure())?,
                volume: self.state.volume(),
                hmc_acceptance: self.counters.hmc_ratio(),
                volume_acceptance: self.counters.volume_ratio(),
                delta_h: self.last_delta_h,
            };
            sink.thermo(&record)?;
        }
        if events.trajectory {
            sink.trajectory(&TrajectoryFrame {
                sweep,
                box_length: self.state.box_length(),
                atom_ids: self.state.atom_ids(),
                positions: &self.state.positions,
            })?;
        }
        if events.restart_primary {
            sink.restart(RestartSlot::Primary, &self.engine)?;
        }
        if events.restart_alternate {
            sink.restart(RestartSlot::Alternate, &self.engine)?;
        }
        if events.flush {
            sink.flush()?;
        }
        Ok(())
    }
}
