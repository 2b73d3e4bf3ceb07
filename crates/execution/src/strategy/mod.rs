//! Keeper action evaluation and execution.

mod evaluator;
mod executor;

pub use evaluator::*;
pub use executor::*;
