//! Standard normal distribution helpers shared by every pricing formula.

use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Standard normal cumulative distribution function, `P(Z <= x)`.
///
/// Evaluated through the complementary error function so the lower tail keeps
/// full relative precision instead of cancelling against 1.
pub fn cumulative_normal(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal probability density function.
pub fn normal_density(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}
