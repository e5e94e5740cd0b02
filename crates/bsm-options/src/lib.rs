pub mod greeks;
pub mod normal;
pub mod pricing;
pub mod solver;

pub use greeks::*;
pub use normal::*;
pub use pricing::*;
pub use solver::*;
