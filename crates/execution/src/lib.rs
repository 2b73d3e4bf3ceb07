//! Everlong keeper engine.
//!
//! This crate drives vault maintenance on a fixed cadence:
//! - Vault discovery through the role manager
//! - Predicate evaluation against the keeper contract
//! - Prioritized submission of maintenance transactions
//! - Operator alerts for fatal errors

/// Prelude module for convenient imports.
pub mod prelude;

/// Operator alerts.
pub mod alerts;
/// Keeper error types.
pub mod error;
/// Reconciliation loop.
pub mod scheduler;
/// Predicate evaluation and action execution.
pub mod strategy;
/// Vault discovery.
pub mod sync;

#[cfg(test)]
mod test_support;
