pub mod contract;
pub mod errors;
pub mod greeks;

pub use contract::*;
pub use errors::*;
pub use greeks::*;
