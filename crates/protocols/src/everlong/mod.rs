//! Everlong keeper, role manager and vault adapter.
//!
//! - Contract bindings
//! - Keeper call encoding
//! - JSON-RPC gateway implementing the keeper traits

/// Solidity bindings for the contracts the bots touch.
pub mod bindings;
/// Keeper call encoding.
pub mod call;
/// JSON-RPC gateway.
pub mod gateway;

pub use call::KeeperCall;
pub use gateway::{EvmGateway, GatewayConfig, parse_signer};
