use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Black-Scholes-Merton analytics
#[derive(Error, Debug)]
pub enum BsmError {
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Contract parameter validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Implied volatility solver failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("solver did not converge after {iterations} iterations, last sigma: {last_sigma:.6}")]
    DidNotConverge { last_sigma: f64, iterations: u32 },

    #[error("degenerate inputs: {0}")]
    Degenerate(DegeneracyReason),
}

/// Why an implied volatility could not be searched for at all.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DegeneracyReason {
    #[error("observed price {price:.6} is outside no-arbitrage bounds [{lower:.6}, {upper:.6}]")]
    PriceOutOfBounds { price: f64, lower: f64, upper: f64 },

    #[error("observed price {price:.6} is not bracketed by [{low_price:.6}, {high_price:.6}]")]
    NotBracketed {
        price: f64,
        low_price: f64,
        high_price: f64,
    },

    #[error("residual became non-finite at sigma {sigma}")]
    NonFiniteResidual { sigma: f64 },

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for Black-Scholes-Merton operations
pub type BsmResult<T> = Result<T, BsmError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::BsmError::Config(format!($($arg)*))
    };
}
