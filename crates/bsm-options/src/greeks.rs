//! Greek sensitivities, individually and resolved at the implied volatility.
//!
//! Theta is per calendar day; rho and vega are per 1% move.

use bsm_types::{BsmResult, Greeks, OptionContract, OptionKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normal::{cumulative_normal, normal_density};
use crate::pricing::{distances, price, Distances};
use crate::solver::{implied_volatility_with, SolverConfig};

const DAYS_PER_YEAR: f64 = 365.0;
const PERCENT: f64 = 100.0;

pub fn delta(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, .. } = distances(contract, sigma);
    let div_disc = contract.dividend_discount();
    match contract.kind() {
        OptionKind::Call => div_disc * cumulative_normal(d1),
        OptionKind::Put => -div_disc * cumulative_normal(-d1),
    }
}

/// Same for calls and puts.
pub fn gamma(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, .. } = distances(contract, sigma);
    normal_density(d1) * contract.dividend_discount()
        / (contract.underlying_price() * sigma * contract.time_to_maturity().sqrt())
}

/// Time decay per calendar day.
///
/// The call branch carries no dividend terms; the put branch does.
pub fn theta(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, d2 } = distances(contract, sigma);
    let s = contract.underlying_price();
    let k = contract.strike_price();
    let r = contract.risk_free_rate();
    let q = contract.dividend_yield();
    let sqrt_t = contract.time_to_maturity().sqrt();
    let disc = contract.discount_factor();
    let div_disc = contract.dividend_discount();

    let annual = match contract.kind() {
        OptionKind::Call => {
            -s * normal_density(d1) * sigma / (2.0 * sqrt_t) - r * k * disc * cumulative_normal(d2)
        }
        OptionKind::Put => {
            -s * normal_density(d1) * sigma * div_disc / (2.0 * sqrt_t)
                + r * k * disc * cumulative_normal(-d2)
                - q * s * div_disc * cumulative_normal(-d1)
        }
    };
    annual / DAYS_PER_YEAR
}

/// Rate sensitivity per 1% move.
pub fn rho(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d2, .. } = distances(contract, sigma);
    let k_t_disc = contract.strike_price() * contract.time_to_maturity() * contract.discount_factor();
    match contract.kind() {
        OptionKind::Call => k_t_disc * cumulative_normal(d2) / PERCENT,
        OptionKind::Put => -k_t_disc * cumulative_normal(-d2) / PERCENT,
    }
}

/// Volatility sensitivity per 1% move. Same for calls and puts.
pub fn vega(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, .. } = distances(contract, sigma);
    contract.underlying_price()
        * contract.time_to_maturity().sqrt()
        * normal_density(d1)
        * contract.dividend_discount()
        / PERCENT
}

/// All five greeks at a caller-supplied volatility.
pub fn greeks_at(contract: &OptionContract, sigma: f64) -> Greeks {
    Greeks {
        delta: delta(contract, sigma),
        gamma: gamma(contract, sigma),
        theta: theta(contract, sigma),
        rho: rho(contract, sigma),
        vega: vega(contract, sigma),
    }
}

/// Solve for the implied volatility of the observed price, then evaluate
/// every greek once at that volatility.
pub fn compute_greeks(contract: &OptionContract) -> BsmResult<Greeks> {
    compute_greeks_with(contract, &SolverConfig::default())
}

pub fn compute_greeks_with(contract: &OptionContract, config: &SolverConfig) -> BsmResult<Greeks> {
    Ok(evaluate(contract, config)?.greeks)
}

/// Full valuation of a quoted contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub implied_volatility: f64,
    /// Solver iterations spent reaching `implied_volatility`.
    pub iterations: u32,
    /// Model price at `implied_volatility`; within tolerance of the observed price.
    pub price: f64,
    pub greeks: Greeks,
}

pub fn evaluate(contract: &OptionContract, config: &SolverConfig) -> BsmResult<Valuation> {
    let solution = implied_volatility_with(contract, config);
    let iterations = solution.iterations().unwrap_or(0);
    let sigma = solution.into_result()?;

    let valuation = Valuation {
        implied_volatility: sigma,
        iterations,
        price: price(contract, sigma),
        greeks: greeks_at(contract, sigma),
    };
    debug!("Valued {}: iv={} {}", contract, sigma, valuation.greeks);
    Ok(valuation)
}
