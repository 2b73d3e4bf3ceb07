//! Keeper error taxonomy.

use alloy::primitives::Address;
use everlong_domain::{KeeperAction, VaultTarget};
use everlong_protocols::GatewayError;
use thiserror::Error;

/// Errors that stop the keeper loop.
#[derive(Debug, Error)]
pub enum KeeperError {
    /// The vault set or a strategy queue could not be read.
    #[error("vault discovery failed: {0}")]
    Discovery(#[source] GatewayError),

    /// A managed vault has nothing at the head of its default queue.
    #[error("vault {vault} has no strategy in its default queue")]
    MissingStrategy {
        /// Vault with the empty queue.
        vault: Address,
    },

    /// The chain refused the keeper identity.
    #[error("keeper identity rejected during {action} on {target}: {source}")]
    Unauthorized {
        action: KeeperAction,
        target: VaultTarget,
        #[source]
        source: GatewayError,
    },
}

/// One or more predicate reads failed for a pair. Recovered by the loop.
#[derive(Debug, Clone, Error)]
#[error("predicate reads failed for {target}:{}", render_failures(.failures))]
pub struct PredicateError {
    /// Pair whose reads failed.
    pub target: VaultTarget,
    /// Every failed read, in priority order.
    pub failures: Vec<(KeeperAction, GatewayError)>,
}

fn render_failures(failures: &[(KeeperAction, GatewayError)]) -> String {
    failures
        .iter()
        .map(|(action, err)| format!(" [{action}: {err}]"))
        .collect()
}
