use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// The single source of randomness for a run.
///
/// Reproducibility depends on the order of draws, not only the seed: per sweep
/// the scheduler draws first, then the move draws (3N normals and one uniform
/// for HMC, two uniforms for a volume move).
pub trait RandomStream {
    /// Uniform in [0, 1)
    fn uniform(&mut self) -> f64;

    fn standard_normal(&mut self) -> f64;
}

/// ChaCha8 stream seeded from a `u64`; identical across platforms.
#[derive(Clone, Debug)]
pub struct SeededStream {
    rng: ChaCha8Rng,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        SeededStream {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomStream for SeededStream {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

/// Replays fixed values, for pinning a Metropolis decision in tests.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedStream {
    pub uniforms: std::collections::VecDeque<f64>,
    pub normals: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl ScriptedStream {
    pub fn new(uniforms: &[f64], normals: &[f64]) -> Self {
        ScriptedStream {
            uniforms: uniforms.iter().copied().collect(),
            normals: normals.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomStream for ScriptedStream {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().expect("scripted uniform draws exhausted")
    }

    fn standard_normal(&mut self) -> f64 {
        self.normals.pop_front().expect("scripted normal draws exhausted")
    }
}
