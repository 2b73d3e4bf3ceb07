//! Randomized vault fuzzing on a local fork.
//!
//! Agents deposit into and redeem from Everlong vaults at random while the
//! keeper maintains them, surfacing any revert that is not on the expected list.

/// Fuzz agents and funding.
pub mod agent;
/// Fuzzing errors.
pub mod error;
/// Fuzz loop.
pub mod fuzzer;
/// Expected reverts.
pub mod ignore;
/// Random trade selection.
pub mod trade;

pub use agent::{DAI_ADDRESS, DAI_WHALE, FuzzAgent, Funding};
pub use error::FuzzError;
pub use fuzzer::{
    FuzzConfig, FuzzVault, IterationReport, TradeOutcome, VaultFuzzer, distinct_assets,
    resolve_vaults,
};
pub use ignore::{IGNORED_REVERTS, is_ignorable_revert};
pub use trade::{TradeKind, choose_trade, pick_amount};
