//! Prelude module for convenient imports.
//!
//! ```rust
//! use everlong_protocols::prelude::*;
//! ```

pub use crate::error::{GatewayError, decode_revert_reason};
pub use crate::everlong::{EvmGateway, GatewayConfig, KeeperCall, parse_signer};
pub use crate::rpc::{HttpProvider, RpcConfig, chain_label, connect_http, raw_request};
pub use crate::transaction::TransactionSender;
pub use crate::{KeeperContract, VaultManager, VaultReader};
