use bsm_options::*;
use bsm_types::{years_to_expiry, OptionContract};
use chrono::{Duration, Utc};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Black-Scholes-Merton basic usage");

    // 77 calendar days to expiry
    let now = Utc::now();
    let t = years_to_expiry(now + Duration::days(77), now);

    let contract = OptionContract::call(112.5, 190.0, t, 0.5, 0.0, 1.2)?;
    println!("Contract: {}", contract);

    let valuation = evaluate(&contract, &SolverConfig::default())?;
    println!(
        "Implied volatility: {:.6} ({} iterations)",
        valuation.implied_volatility, valuation.iterations
    );
    println!("Model price at IV: {:.6}", valuation.price);
    let intrinsic = contract.intrinsic_value();
    println!(
        "Intrinsic value: {:.6}, time value: {:.6}",
        intrinsic,
        valuation.price - intrinsic
    );
    println!("Greeks: {}", valuation.greeks);

    // Same inputs on the put side, priced at the call's volatility
    let put = contract.with_kind(bsm_types::OptionKind::Put);
    let put_price = price(&put, valuation.implied_volatility);
    println!("Put at the same volatility: {:.6}", put_price);
    println!("Put greeks: {}", greeks_at(&put, valuation.implied_volatility));

    // Tighter budget, reported explicitly instead of returning a stale number
    let tight = SolverConfig::from_json(r#"{"max_iterations": 2}"#)?;
    match implied_volatility_with(&contract, &tight) {
        IvSolution::Converged { sigma, iterations } => {
            println!("Converged to {:.6} in {} iterations", sigma, iterations)
        }
        IvSolution::DidNotConverge { last_sigma, iterations } => println!(
            "No convergence after {} iterations (last sigma {:.6})",
            iterations, last_sigma
        ),
        IvSolution::Degenerate(reason) => println!("Degenerate inputs: {}", reason),
    }

    Ok(())
}
