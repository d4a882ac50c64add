/// min(1, exp(-argument)), with the bound applied explicitly.
///
/// A NaN argument gives zero so a broken energy can never be accepted.
pub fn acceptance_probability(argument: f64) -> f64 {
    if argument <= 0.0 {
        1.0
    } else if argument > 0.0 {
        (-argument).exp()
    } else {
        0.0
    }
}

/// Accept iff `u <= min(1, exp(-argument))`. The comparison is inclusive.
pub fn metropolis_accept(u: f64, argument: f64) -> bool {
    !argument.is_nan() && u <= acceptance_probability(argument)
}
