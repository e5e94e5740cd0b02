use serde::{Deserialize, Serialize};
use std::fmt;

/// Option greeks evaluated at a single volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Rate of change of option price w.r.t. underlying price.
    pub delta: f64,
    /// Rate of change of delta w.r.t. underlying price.
    pub gamma: f64,
    /// Rate of change of option price w.r.t. time (per calendar day).
    pub theta: f64,
    /// Rate of change of option price w.r.t. risk-free rate (per 1% move).
    pub rho: f64,
    /// Rate of change of option price w.r.t. volatility (per 1% move).
    pub vega: f64,
}

impl fmt::Display for Greeks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delta={:.6} gamma={:.6} theta={:.6} rho={:.6} vega={:.6}",
            self.delta, self.gamma, self.theta, self.rho, self.vega
        )
    }
}
