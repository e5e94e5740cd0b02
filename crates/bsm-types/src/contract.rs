use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ContractError;

/// Option type — call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "Call"),
            OptionKind::Put => write!(f, "Put"),
        }
    }
}

/// Seconds in the ACT/365 year used for time to maturity.
const SECONDS_PER_YEAR: f64 = 365.0 * 86400.0;

/// Years remaining from `now` until `expiration` on an ACT/365 basis.
/// Returns 0 if already expired.
pub fn years_to_expiry(expiration: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let secs = (expiration - now).num_seconds();
    if secs <= 0 {
        0.0
    } else {
        secs as f64 / SECONDS_PER_YEAR
    }
}

/// A European option together with the market inputs needed to value it.
///
/// Construction validates every field, so the pricing formulas never see a
/// non-positive spot, strike, or time to maturity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionContract {
    underlying_price: f64,
    strike_price: f64,
    time_to_maturity: f64,
    risk_free_rate: f64,
    dividend_yield: f64,
    observed_price: f64,
    kind: OptionKind,
}

impl OptionContract {
    pub fn new(
        underlying_price: f64,
        strike_price: f64,
        time_to_maturity: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        observed_price: f64,
        kind: OptionKind,
    ) -> Result<Self, ContractError> {
        positive("underlying_price", underlying_price)?;
        positive("strike_price", strike_price)?;
        positive("time_to_maturity", time_to_maturity)?;
        finite("risk_free_rate", risk_free_rate)?;
        finite("dividend_yield", dividend_yield)?;
        non_negative("observed_price", observed_price)?;

        Ok(Self {
            underlying_price,
            strike_price,
            time_to_maturity,
            risk_free_rate,
            dividend_yield,
            observed_price,
            kind,
        })
    }

    /// Convenience constructor for a call.
    pub fn call(
        underlying_price: f64,
        strike_price: f64,
        time_to_maturity: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        observed_price: f64,
    ) -> Result<Self, ContractError> {
        Self::new(
            underlying_price,
            strike_price,
            time_to_maturity,
            risk_free_rate,
            dividend_yield,
            observed_price,
            OptionKind::Call,
        )
    }

    /// Convenience constructor for a put.
    pub fn put(
        underlying_price: f64,
        strike_price: f64,
        time_to_maturity: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        observed_price: f64,
    ) -> Result<Self, ContractError> {
        Self::new(
            underlying_price,
            strike_price,
            time_to_maturity,
            risk_free_rate,
            dividend_yield,
            observed_price,
            OptionKind::Put,
        )
    }

    /// Same contract quoted at a different market price.
    pub fn with_observed_price(self, observed_price: f64) -> Result<Self, ContractError> {
        non_negative("observed_price", observed_price)?;
        Ok(Self {
            observed_price,
            ..self
        })
    }

    /// Same market inputs on the other side of the call/put pair.
    pub fn with_kind(self, kind: OptionKind) -> Self {
        Self { kind, ..self }
    }

    pub fn underlying_price(&self) -> f64 {
        self.underlying_price
    }

    pub fn strike_price(&self) -> f64 {
        self.strike_price
    }

    pub fn time_to_maturity(&self) -> f64 {
        self.time_to_maturity
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    pub fn observed_price(&self) -> f64 {
        self.observed_price
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn is_call(&self) -> bool {
        self.kind == OptionKind::Call
    }

    /// `e^(-rT)`
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }

    /// `e^(-qT)`
    pub fn dividend_discount(&self) -> f64 {
        (-self.dividend_yield * self.time_to_maturity).exp()
    }

    /// Intrinsic value at the current underlying price.
    pub fn intrinsic_value(&self) -> f64 {
        match self.kind {
            OptionKind::Call => (self.underlying_price - self.strike_price).max(0.0),
            OptionKind::Put => (self.strike_price - self.underlying_price).max(0.0),
        }
    }
}

// Deserialization goes through `new` so a decoded contract is always valid.
impl<'de> Deserialize<'de> for OptionContract {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            underlying_price: f64,
            strike_price: f64,
            time_to_maturity: f64,
            risk_free_rate: f64,
            dividend_yield: f64,
            observed_price: f64,
            kind: OptionKind,
        }

        let raw = Raw::deserialize(deserializer)?;
        OptionContract::new(
            raw.underlying_price,
            raw.strike_price,
            raw.time_to_maturity,
            raw.risk_free_rate,
            raw.dividend_yield,
            raw.observed_price,
            raw.kind,
        )
        .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for OptionContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} K={} S={} T={:.4}y",
            self.kind, self.strike_price, self.underlying_price, self.time_to_maturity,
        )
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ContractError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ContractError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ContractError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ContractError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ContractError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture_call() -> OptionContract {
        OptionContract::call(112.5, 190.0, 0.21095890410958903, 0.5, 0.0, 1.2).unwrap()
    }

    #[test]
    fn test_valid_contract() {
        let c = fixture_call();
        assert_eq!(c.underlying_price(), 112.5);
        assert_eq!(c.strike_price(), 190.0);
        assert_eq!(c.observed_price(), 1.2);
        assert!(c.is_call());
        assert_eq!(c.kind(), OptionKind::Call);
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let err = OptionContract::call(0.0, 100.0, 1.0, 0.05, 0.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            ContractError::NonPositive {
                field: "underlying_price",
                value: 0.0
            }
        );

        let err = OptionContract::put(100.0, -1.0, 1.0, 0.05, 0.0, 5.0).unwrap_err();
        assert!(matches!(err, ContractError::NonPositive { field: "strike_price", .. }));

        let err = OptionContract::call(100.0, 100.0, 0.0, 0.05, 0.0, 5.0).unwrap_err();
        assert!(matches!(err, ContractError::NonPositive { field: "time_to_maturity", .. }));
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        let err = OptionContract::call(100.0, 100.0, 1.0, f64::NAN, 0.0, 5.0).unwrap_err();
        assert!(matches!(err, ContractError::NonFinite { field: "risk_free_rate", .. }));

        let err = OptionContract::call(f64::INFINITY, 100.0, 1.0, 0.05, 0.0, 5.0).unwrap_err();
        assert!(matches!(err, ContractError::NonFinite { field: "underlying_price", .. }));
    }

    #[test]
    fn test_negative_rate_and_yield_allowed() {
        let c = OptionContract::put(100.0, 100.0, 1.0, -0.01, -0.02, 5.0);
        assert!(c.is_ok());
    }

    #[test]
    fn test_with_observed_price() {
        let c = fixture_call().with_observed_price(2.5).unwrap();
        assert_eq!(c.observed_price(), 2.5);
        assert!(fixture_call().with_observed_price(-1.0).is_err());
    }

    #[test]
    fn test_intrinsic_value() {
        let call = OptionContract::call(160.0, 150.0, 0.5, 0.05, 0.0, 12.0).unwrap();
        assert_eq!(call.intrinsic_value(), 10.0);

        let put = call.with_kind(OptionKind::Put);
        assert_eq!(put.intrinsic_value(), 0.0);
    }

    #[test]
    fn test_discount_factors() {
        let c = OptionContract::call(100.0, 100.0, 2.0, 0.05, 0.01, 10.0).unwrap();
        assert!((c.discount_factor() - (-0.1_f64).exp()).abs() < 1e-15);
        assert!((c.dividend_discount() - (-0.02_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_years_to_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 3, 20, 20, 0, 0).unwrap();
        let expiration = now + chrono::Duration::days(77);
        let t = years_to_expiry(expiration, now);
        assert!((t - 0.21095890410958903).abs() < 1e-12, "t = {t}");

        assert_eq!(years_to_expiry(now, expiration), 0.0);
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let c = fixture_call();
        let json = serde_json::to_string(&c).unwrap();
        let back: OptionContract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let bad = json.replace("\"strike_price\":190.0", "\"strike_price\":-190.0");
        assert!(serde_json::from_str::<OptionContract>(&bad).is_err());
    }

    #[test]
    fn test_display() {
        let s = format!("{}", fixture_call());
        assert!(s.contains("Call"));
        assert!(s.contains("K=190"));
        assert!(s.contains("S=112.5"));
    }
}
