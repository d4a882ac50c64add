/*
Monte Carlo moves and the sweep loop.

One sweep is exactly one trial move. The scheduler draws a uniform number to
pick the HMC move or the volume move, the move runs against the engine and the
simulation state, and the outcome is tallied. Each move function takes the
state, the engine and the random stream explicitly; nothing is global.
*/

pub mod hmc;
pub mod metropolis;
pub mod random;
pub mod sampler;
pub mod velocities;
pub mod volume;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Hmc,
    Volume,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    pub accepted: bool,
    /// Dimensionless Metropolis argument: dH for HMC, the pressure coupled
    /// argument for volume moves.
    pub argument: f64,
}
