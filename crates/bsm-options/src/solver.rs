//! Implied volatility via a safeguarded Newton-Raphson iteration.
//!
//! The pricer is monotonically increasing in volatility, so every solve keeps
//! a bracket `[low, high]` around the root and narrows it with the sign of the
//! residual. A Newton step is taken whenever it lands strictly inside the
//! bracket; otherwise (flat vega, overshoot, NaN step) the iterate falls back
//! to the bracket midpoint. The iteration therefore cannot drift to a negative
//! volatility or divide through a vanishing vega.

use bsm_types::{config_error, BsmResult, DegeneracyReason, OptionContract, SolverError};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::pricing::{price, price_bounds, raw_vega};

/// Configuration for the implied volatility solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting volatility for every solve (default: 0.25 = 25%).
    pub initial_guess: f64,
    /// Absolute price tolerance that counts as converged.
    pub tolerance: f64,
    /// Maximum iterations before giving up.
    pub max_iterations: u32,
    /// Lower edge of the search bracket.
    pub min_volatility: f64,
    /// Upper edge of the initial search bracket (default: 5.0 = 500%).
    pub max_volatility: f64,
    /// Hard limit the upper edge may be doubled up to when the observed
    /// price lies above the price at `max_volatility`.
    pub volatility_ceiling: f64,
    /// Derivative magnitude below which a Newton step is not attempted.
    pub min_vega: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.25,
            tolerance: 1e-8,
            max_iterations: 1000,
            min_volatility: 1e-4,
            max_volatility: 5.0,
            volatility_ceiling: 100.0,
            min_vega: 1e-12,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> BsmResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    pub fn with_bounds(mut self, min_volatility: f64, max_volatility: f64) -> Self {
        self.min_volatility = min_volatility;
        self.max_volatility = max_volatility;
        self
    }

    pub fn with_volatility_ceiling(mut self, volatility_ceiling: f64) -> Self {
        self.volatility_ceiling = volatility_ceiling;
        self
    }

    pub fn with_min_vega(mut self, min_vega: f64) -> Self {
        self.min_vega = min_vega;
        self
    }

    pub fn validate(&self) -> BsmResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(config_error!("tolerance must be positive, got {}", self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(config_error!("max_iterations must be at least 1"));
        }
        if !(self.min_volatility.is_finite() && self.min_volatility > 0.0) {
            return Err(config_error!(
                "min_volatility must be positive, got {}",
                self.min_volatility
            ));
        }
        if !(self.max_volatility.is_finite() && self.max_volatility > self.min_volatility) {
            return Err(config_error!(
                "max_volatility must exceed min_volatility: [{}, {}]",
                self.min_volatility,
                self.max_volatility
            ));
        }
        if !(self.volatility_ceiling.is_finite() && self.volatility_ceiling >= self.max_volatility) {
            return Err(config_error!(
                "volatility_ceiling must be at least max_volatility: {} < {}",
                self.volatility_ceiling,
                self.max_volatility
            ));
        }
        if !self.initial_guess.is_finite() {
            return Err(config_error!("initial_guess must be finite, got {}", self.initial_guess));
        }
        if !(self.min_vega.is_finite() && self.min_vega >= 0.0) {
            return Err(config_error!("min_vega must be non-negative, got {}", self.min_vega));
        }
        Ok(())
    }
}

/// Outcome of an implied volatility solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IvSolution {
    /// The price residual dropped below tolerance.
    Converged { sigma: f64, iterations: u32 },
    /// The iteration budget ran out; `last_sigma` is the final iterate.
    DidNotConverge { last_sigma: f64, iterations: u32 },
    /// No meaningful volatility exists for these inputs.
    Degenerate(DegeneracyReason),
}

impl IvSolution {
    /// Converged volatility, if any.
    pub fn sigma(&self) -> Option<f64> {
        match self {
            IvSolution::Converged { sigma, .. } => Some(*sigma),
            _ => None,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, IvSolution::Converged { .. })
    }

    /// Iterations spent, when the solver got as far as iterating.
    pub fn iterations(&self) -> Option<u32> {
        match self {
            IvSolution::Converged { iterations, .. }
            | IvSolution::DidNotConverge { iterations, .. } => Some(*iterations),
            IvSolution::Degenerate(_) => None,
        }
    }

    pub fn into_result(self) -> Result<f64, SolverError> {
        match self {
            IvSolution::Converged { sigma, .. } => Ok(sigma),
            IvSolution::DidNotConverge {
                last_sigma,
                iterations,
            } => Err(SolverError::DidNotConverge {
                last_sigma,
                iterations,
            }),
            IvSolution::Degenerate(reason) => Err(SolverError::Degenerate(reason)),
        }
    }
}

/// Find `x` in `[config.min_volatility, config.max_volatility]` with
/// `f(x).0 == target` for an increasing function `f` returning
/// `(value, derivative)`.
pub fn find_root<F>(f: F, target: f64, config: &SolverConfig) -> IvSolution
where
    F: Fn(f64) -> (f64, f64),
{
    if let Err(e) = config.validate() {
        return IvSolution::Degenerate(DegeneracyReason::InvalidConfig(e.to_string()));
    }

    let mut low = config.min_volatility;
    let mut high = config.max_volatility;
    let mut x = config.initial_guess.clamp(low, high);

    for iteration in 1..=config.max_iterations {
        let (value, slope) = f(x);
        let diff = value - target;

        if !diff.is_finite() {
            warn!("Residual became non-finite at sigma {} (iteration {})", x, iteration);
            return IvSolution::Degenerate(DegeneracyReason::NonFiniteResidual { sigma: x });
        }

        if diff.abs() < config.tolerance {
            debug!("Converged to sigma {} in {} iterations", x, iteration);
            return IvSolution::Converged {
                sigma: x,
                iterations: iteration,
            };
        }

        if diff > 0.0 {
            high = x;
        } else {
            low = x;
        }

        let newton = x - diff / slope;
        x = if slope.abs() >= config.min_vega && newton > low && newton < high {
            newton
        } else {
            let mid = 0.5 * (low + high);
            debug!(
                "Newton step rejected at sigma {} (vega {}), bisecting to {}",
                x, slope, mid
            );
            mid
        };
        trace!("iteration {}: residual {}, next sigma {}", iteration, diff, x);
    }

    warn!(
        "Solver did not converge after {} iterations, last sigma {}",
        config.max_iterations, x
    );
    IvSolution::DidNotConverge {
        last_sigma: x,
        iterations: config.max_iterations,
    }
}

/// Implied volatility of `contract.observed_price()` with the default config.
pub fn implied_volatility(contract: &OptionContract) -> IvSolution {
    implied_volatility_with(contract, &SolverConfig::default())
}

/// Implied volatility of `contract.observed_price()`.
pub fn implied_volatility_with(contract: &OptionContract, config: &SolverConfig) -> IvSolution {
    if let Err(e) = config.validate() {
        return IvSolution::Degenerate(DegeneracyReason::InvalidConfig(e.to_string()));
    }

    let target = contract.observed_price();

    let (lower, upper) = price_bounds(contract);
    if target <= lower || target >= upper {
        warn!(
            "Observed price {} for {} outside no-arbitrage bounds [{}, {}]",
            target, contract, lower, upper
        );
        return IvSolution::Degenerate(DegeneracyReason::PriceOutOfBounds {
            price: target,
            lower,
            upper,
        });
    }

    let mut search = config.clone();
    let low_price = price(contract, search.min_volatility);
    let mut high_price = price(contract, search.max_volatility);
    while target > high_price + search.tolerance
        && search.max_volatility < search.volatility_ceiling
    {
        search.max_volatility = (2.0 * search.max_volatility).min(search.volatility_ceiling);
        high_price = price(contract, search.max_volatility);
        debug!("Widened volatility bracket to {}", search.max_volatility);
    }

    if target < low_price - search.tolerance || target > high_price + search.tolerance {
        warn!(
            "Observed price {} for {} not reachable within volatility bracket [{}, {}]",
            target, contract, search.min_volatility, search.max_volatility
        );
        return IvSolution::Degenerate(DegeneracyReason::NotBracketed {
            price: target,
            low_price,
            high_price,
        });
    }

    find_root(
        |sigma| (price(contract, sigma), raw_vega(contract, sigma)),
        target,
        &search,
    )
}
