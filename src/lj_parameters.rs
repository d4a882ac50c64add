use serde::{Deserialize, Serialize};

/// Liquid argon in real units: epsilon [kcal/mol], sigma [A], mass [g/mol].
pub const ARGON_EPSILON: f64 = 0.238;
pub const ARGON_SIGMA: f64 = 3.405;
pub const ARGON_MASS: f64 = 39.948;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LJParameters {
    pub epsilon: f64,
    pub sigma: f64,
}

impl LJParameters {
    pub fn argon() -> Self {
        LJParameters {
            epsilon: ARGON_EPSILON,
            sigma: ARGON_SIGMA,
        }
    }

    /// Lorentz-Berthelot mixing rules
    pub fn mix(&self, other: &LJParameters) -> LJParameters {
        LJParameters {
            epsilon: (self.epsilon * other.epsilon).sqrt(),
            sigma: 0.5 * (self.sigma + other.sigma),
        }
    }
}

// -- lennard jones potential and force

pub fn lennard_jones_potential(r: f64, sigma: f64, eps: f64) -> f64 {
    /*
    Return the standard lennard jones function
     */
    if r < 1e-9 {
        return 0.0; // Avoid singularity
    }
    let sr6 = (sigma / r).powi(6);
    4.0 * eps * (sr6 * sr6 - sr6)
}

/// Magnitude of -dV/dr; positive means repulsive.
pub fn lennard_jones_force(r: f64, sigma: f64, epsilon: f64) -> f64 {
    if r < 1e-9 {
        return 0.0; // Prevent singularity
    }
    let sr6 = (sigma / r).powi(6);
    24.0 * epsilon * (2.0 * sr6 * sr6 - sr6) / r
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn potential_is_zero_at_sigma_and_minimal_at_r_min() {
        let p = LJParameters::argon();
        assert!(lennard_jones_potential(p.sigma, p.sigma, p.epsilon).abs() < 1e-12);

        let r_min = 2f64.powf(1.0 / 6.0) * p.sigma;
        assert_relative_eq!(
            lennard_jones_potential(r_min, p.sigma, p.epsilon),
            -p.epsilon,
            max_relative = 1e-12
        );
        assert!(lennard_jones_force(r_min, p.sigma, p.epsilon).abs() < 1e-12);
    }

    #[test]
    fn force_matches_numerical_derivative() {
        let (sigma, eps) = (1.0, 1.0);
        let h = 1e-6;
        for r in [0.95, 1.1, 1.5, 2.3] {
            let numerical = -(lennard_jones_potential(r + h, sigma, eps)
                - lennard_jones_potential(r - h, sigma, eps))
                / (2.0 * h);
            assert_relative_eq!(
                lennard_jones_force(r, sigma, eps),
                numerical,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn mixing_uses_geometric_epsilon_and_arithmetic_sigma() {
        let a = LJParameters { epsilon: 1.0, sigma: 2.0 };
        let b = LJParameters { epsilon: 4.0, sigma: 4.0 };
        let ab = a.mix(&b);
        assert_eq!(ab.epsilon, 2.0);
        assert_eq!(ab.sigma, 3.0);
    }

    #[test]
    fn overlapping_particles_do_not_blow_up() {
        assert_eq!(lennard_jones_potential(0.0, 1.0, 1.0), 0.0);
        assert_eq!(lennard_jones_force(0.0, 1.0, 1.0), 0.0);
    }
}
