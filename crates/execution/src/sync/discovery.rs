//! Vault discovery.

use crate::error::KeeperError;
use everlong_domain::VaultTarget;
use everlong_protocols::{VaultManager, VaultReader};
use std::sync::Arc;
use tracing::{debug, error};

/// Queue slot holding the strategy the keeper maintains.
pub const ACTIVE_STRATEGY_INDEX: usize = 0;

/// Resolves the current (vault, strategy) pairs from the role manager.
///
/// Nothing is cached: every call re-reads the vault set and every queue.
pub struct VaultDiscovery {
    manager: Arc<dyn VaultManager>,
    vaults: Arc<dyn VaultReader>,
}

impl VaultDiscovery {
    /// Creates a discovery over the given manager and vault reader.
    pub fn new(manager: Arc<dyn VaultManager>, vaults: Arc<dyn VaultReader>) -> Self {
        Self { manager, vaults }
    }

    /// Returns one target per managed vault, in manager order.
    ///
    /// # Errors
    /// [`KeeperError::Discovery`] if a read fails and
    /// [`KeeperError::MissingStrategy`] if a vault's queue has no active
    /// strategy.
    pub async fn discover(&self) -> Result<Vec<VaultTarget>, KeeperError> {
        let vaults = self
            .manager
            .list_vaults()
            .await
            .map_err(KeeperError::Discovery)?;

        let mut targets = Vec::with_capacity(vaults.len());
        for vault in vaults {
            let queue = self
                .vaults
                .default_queue(vault)
                .await
                .map_err(KeeperError::Discovery)?;

            let Some(strategy) = queue.get(ACTIVE_STRATEGY_INDEX).copied() else {
                error!(vault = %vault, "Vault has an empty default queue");
                return Err(KeeperError::MissingStrategy { vault });
            };

            debug!(vault = %vault, strategy = %strategy, "Discovered vault");
            targets.push(VaultTarget::new(vault, strategy));
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeChain, addr};
    use everlong_protocols::GatewayError;

    fn discovery(chain: FakeChain) -> VaultDiscovery {
        let chain = Arc::new(chain);
        VaultDiscovery::new(chain.clone(), chain)
    }

    #[tokio::test]
    async fn test_one_target_per_vault_in_order() {
        for n in 0..5u8 {
            let mut chain = FakeChain::new();
            // Reverse byte order so manager order differs from address order.
            for i in (0..n).rev() {
                chain = chain.with_vault(addr(0x10 + i), addr(0x80 + i));
            }

            let targets = discovery(chain).discover().await.unwrap();

            assert_eq!(targets.len(), n as usize);
            for (pos, i) in (0..n).rev().enumerate() {
                assert_eq!(targets[pos], VaultTarget::new(addr(0x10 + i), addr(0x80 + i)));
            }
        }
    }

    #[tokio::test]
    async fn test_empty_queue_is_fatal() {
        let chain = FakeChain::new()
            .with_vault(addr(1), addr(2))
            .with_empty_vault(addr(3));

        let err = discovery(chain).discover().await.unwrap_err();
        assert!(matches!(err, KeeperError::MissingStrategy { vault } if vault == addr(3)));
    }

    #[tokio::test]
    async fn test_list_failure_is_discovery_error() {
        let chain = FakeChain::new().failing_list(GatewayError::Transport("refused".into()));

        let err = discovery(chain).discover().await.unwrap_err();
        assert!(matches!(err, KeeperError::Discovery(GatewayError::Transport(_))));
    }
}
