//! Black-Scholes-Merton pricing for European options.

use bsm_types::{OptionContract, OptionKind};
use serde::{Deserialize, Serialize};

use crate::normal::{cumulative_normal, normal_density};

/// Standardized distances `d1` and `d2` for a contract at a given volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distances {
    pub d1: f64,
    pub d2: f64,
}

/// Compute d1 and d2.
///
/// `sigma` must be positive; zero or negative volatility propagates as
/// NaN/Inf through every caller.
pub fn distances(contract: &OptionContract, sigma: f64) -> Distances {
    let s = contract.underlying_price();
    let k = contract.strike_price();
    let r = contract.risk_free_rate();
    let q = contract.dividend_yield();
    let t = contract.time_to_maturity();

    let sigma_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    Distances {
        d1,
        d2: d1 - sigma_sqrt_t,
    }
}

/// Theoretical price of the contract at volatility `sigma`.
pub fn price(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, d2 } = distances(contract, sigma);
    let spot_pv = contract.underlying_price() * contract.dividend_discount();
    let strike_pv = contract.strike_price() * contract.discount_factor();

    match contract.kind() {
        OptionKind::Call => spot_pv * cumulative_normal(d1) - strike_pv * cumulative_normal(d2),
        OptionKind::Put => strike_pv * cumulative_normal(-d2) - spot_pv * cumulative_normal(-d1),
    }
}

/// Unscaled vega, `dPrice/dSigma`. Identical for calls and puts.
pub fn raw_vega(contract: &OptionContract, sigma: f64) -> f64 {
    let Distances { d1, .. } = distances(contract, sigma);
    contract.underlying_price()
        * contract.dividend_discount()
        * contract.time_to_maturity().sqrt()
        * normal_density(d1)
}

/// Model-free `(lower, upper)` bounds any European price must respect.
///
/// Call: `max(S·e^(-qT) - K·e^(-rT), 0) .. S·e^(-qT)`.
/// Put:  `max(K·e^(-rT) - S·e^(-qT), 0) .. K·e^(-rT)`.
pub fn price_bounds(contract: &OptionContract) -> (f64, f64) {
    let spot_pv = contract.underlying_price() * contract.dividend_discount();
    let strike_pv = contract.strike_price() * contract.discount_factor();

    match contract.kind() {
        OptionKind::Call => ((spot_pv - strike_pv).max(0.0), spot_pv),
        OptionKind::Put => ((strike_pv - spot_pv).max(0.0), strike_pv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(kind: OptionKind, spot: f64, strike: f64, t: f64, r: f64, q: f64) -> OptionContract {
        OptionContract::new(spot, strike, t, r, q, 0.0, kind).unwrap()
    }

    #[test]
    fn test_textbook_call_and_put() {
        // S=100, K=100, T=1, r=5%, sigma=20%: C = 10.4506, P = 5.5735
        let call = contract(OptionKind::Call, 100.0, 100.0, 1.0, 0.05, 0.0);
        let put = call.with_kind(OptionKind::Put);
        assert!((price(&call, 0.2) - 10.450_583_572_185_565).abs() < 1e-9);
        assert!((price(&put, 0.2) - 5.573_526_022_256_971).abs() < 1e-9);
    }

    #[test]
    fn test_distances() {
        let c = contract(OptionKind::Call, 100.0, 100.0, 1.0, 0.05, 0.0);
        let Distances { d1, d2 } = distances(&c, 0.2);
        assert!((d1 - 0.35).abs() < 1e-12, "d1 = {d1}");
        assert!((d2 - 0.15).abs() < 1e-12, "d2 = {d2}");
    }

    #[test]
    fn test_put_call_parity() {
        let scenarios = [
            (100.0, 100.0, 1.0, 0.05, 0.0),
            (112.5, 190.0, 0.21095890410958903, 0.5, 0.0),
            (150.0, 120.0, 0.5, 0.03, 0.02),
            (80.0, 100.0, 2.0, -0.01, 0.04),
        ];
        for (s, k, t, r, q) in scenarios {
            let call = contract(OptionKind::Call, s, k, t, r, q);
            let put = call.with_kind(OptionKind::Put);
            for sigma in [0.05, 0.2, 0.6, 1.5] {
                let lhs = price(&call, sigma) - price(&put, sigma);
                let rhs = s * (-q * t).exp() - k * (-r * t).exp();
                assert!(
                    (lhs - rhs).abs() < 1e-9,
                    "put-call parity violated: lhs={lhs}, rhs={rhs}, sigma={sigma}"
                );
            }
        }
    }

    #[test]
    fn test_price_increasing_in_sigma() {
        for kind in [OptionKind::Call, OptionKind::Put] {
            let c = contract(kind, 100.0, 110.0, 0.5, 0.03, 0.01);
            let mut prev = price(&c, 0.05);
            for i in 2..=60 {
                let sigma = i as f64 * 0.05;
                let next = price(&c, sigma);
                assert!(next > prev, "{kind} price not increasing at sigma={sigma}");
                prev = next;
            }
        }
    }

    #[test]
    fn test_raw_vega_matches_finite_difference() {
        let c = contract(OptionKind::Put, 100.0, 95.0, 0.75, 0.02, 0.01);
        let sigma = 0.3;
        let h = 1e-5;
        let fd = (price(&c, sigma + h) - price(&c, sigma - h)) / (2.0 * h);
        assert!((raw_vega(&c, sigma) - fd).abs() < 1e-6);
        assert_eq!(raw_vega(&c, sigma), raw_vega(&c.with_kind(OptionKind::Call), sigma));
    }

    #[test]
    fn test_price_within_bounds() {
        for kind in [OptionKind::Call, OptionKind::Put] {
            let c = contract(kind, 100.0, 90.0, 1.0, 0.04, 0.02);
            let (lower, upper) = price_bounds(&c);
            for sigma in [0.01, 0.2, 1.0, 4.0] {
                let p = price(&c, sigma);
                assert!(p >= lower - 1e-12 && p <= upper + 1e-12, "{kind} {p} not in [{lower}, {upper}]");
            }
        }
    }

    #[test]
    fn test_zero_sigma_is_not_finite() {
        let c = contract(OptionKind::Call, 100.0, 100.0, 1.0, 0.05, 0.0);
        assert!(!distances(&c, 0.0).d1.is_finite());
    }
}
