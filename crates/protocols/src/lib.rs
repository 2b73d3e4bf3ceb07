//! Remote ledger gateway for the Everlong contracts.
//!
//! The keeper core talks to the chain only through the narrow traits in this
//! crate, so it can run against an in-memory fake in tests:
//! - [`VaultManager`]: enumerate managed vaults
//! - [`VaultReader`]: resolve a vault's strategy queue
//! - [`KeeperContract`]: predicate reads and maintenance calls
//!
//! [`everlong::EvmGateway`] implements all three over JSON-RPC.

pub mod error;
pub mod everlong;
pub mod prelude;
pub mod rpc;
pub mod transaction;

use alloy::primitives::Address;
use async_trait::async_trait;
use everlong_domain::{KeeperAction, TxConfirmation, VaultTarget};

pub use error::GatewayError;
pub use everlong::KeeperCall;

/// Registry of vaults managed by the role manager.
#[async_trait]
pub trait VaultManager: Send + Sync {
    /// Returns every managed vault, in the order reported by the contract.
    async fn list_vaults(&self) -> Result<Vec<Address>, GatewayError>;
}

/// Read access to a vault's strategy configuration.
#[async_trait]
pub trait VaultReader: Send + Sync {
    /// Returns the vault's default strategy queue.
    async fn default_queue(&self, vault: Address) -> Result<Vec<Address>, GatewayError>;
}

/// The keeper automation contract.
#[async_trait]
pub trait KeeperContract: Send + Sync {
    /// Reads the gating predicate for `action` on `target`. Pure view call.
    async fn should(&self, action: KeeperAction, target: &VaultTarget)
    -> Result<bool, GatewayError>;

    /// Executes `call` with `eth_call` from the keeper identity without
    /// committing anything.
    async fn simulate(&self, call: &KeeperCall) -> Result<(), GatewayError>;

    /// Signs and submits `call`, then waits for the receipt.
    async fn submit(&self, call: &KeeperCall) -> Result<TxConfirmation, GatewayError>;
}
