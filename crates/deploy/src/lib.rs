//! Everlong deployment tooling.
//!
//! - Forge script execution against a checkout of the everlong contracts
//! - Broadcast record parsing for deployed addresses
//! - Forked anvil chains and their cheatcodes

/// Forge broadcast records.
pub mod broadcast;
/// Deployment errors.
pub mod error;
/// Forge script execution.
pub mod forge;
/// Local anvil fork.
pub mod local_chain;
/// Deployment pipeline.
pub mod pipeline;

pub use error::DeployError;
pub use local_chain::LocalChain;
pub use pipeline::{DeployConfig, DeployedContracts, deploy_everlong};
