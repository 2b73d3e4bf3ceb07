use super::bindings::{IEverlongStrategyKeeper, IRoleManager, IVault};
use super::call::{KeeperCall, decode_predicate, predicate_calldata};
use crate::error::GatewayError;
use crate::rpc::{HttpProvider, RpcConfig, connect_http};
use crate::transaction::TransactionSender;
use crate::{KeeperContract, VaultManager, VaultReader};
use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use everlong_domain::{KeeperAction, TxConfirmation, VaultTarget};
use std::str::FromStr;
use tracing::{debug, info};

/// Addresses and endpoint for an [`EvmGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Endpoint settings.
    pub rpc: RpcConfig,
    /// Keeper contract.
    pub keeper: Address,
    /// Role manager override. When `None` it is read from the keeper's
    /// `roleManager()`.
    pub role_manager: Option<Address>,
}

/// JSON-RPC implementation of the keeper gateway traits.
///
/// Reads go through `eth_call`; maintenance calls are signed locally by the
/// keeper identity and awaited until mined.
pub struct EvmGateway {
    sender: TransactionSender,
    signer: PrivateKeySigner,
    keeper: Address,
    role_manager: Address,
}

impl EvmGateway {
    /// Connects to the endpoint and resolves the role manager.
    pub async fn connect(
        config: GatewayConfig,
        signer: PrivateKeySigner,
    ) -> Result<Self, GatewayError> {
        let provider = connect_http(&config.rpc)?;
        Self::with_provider(provider, config.keeper, config.role_manager, signer).await
    }

    /// Builds a gateway over an existing provider.
    pub async fn with_provider(
        provider: HttpProvider,
        keeper: Address,
        role_manager: Option<Address>,
        signer: PrivateKeySigner,
    ) -> Result<Self, GatewayError> {
        let sender = TransactionSender::new(provider);

        let role_manager = match role_manager {
            Some(address) => address,
            None => {
                let data = IEverlongStrategyKeeper::roleManagerCall {}.abi_encode();
                let raw = sender.call(None, keeper, Bytes::from(data)).await?;
                IEverlongStrategyKeeper::roleManagerCall::abi_decode_returns(&raw, true)?._0
            }
        };

        info!(
            keeper = %keeper,
            role_manager = %role_manager,
            signer = %signer.address(),
            "Keeper gateway ready"
        );

        Ok(Self {
            sender,
            signer,
            keeper,
            role_manager,
        })
    }
}

/// Parses a hex private key, with or without the `0x` prefix.
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, GatewayError> {
    let trimmed = private_key.trim();
    let clean = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    PrivateKeySigner::from_str(clean).map_err(|e| GatewayError::Signer(e.to_string()))
}

#[async_trait]
impl VaultManager for EvmGateway {
    async fn list_vaults(&self) -> Result<Vec<Address>, GatewayError> {
        let data = IRoleManager::getAllVaultsCall {}.abi_encode();
        let raw = self
            .sender
            .call(None, self.role_manager, Bytes::from(data))
            .await?;
        let vaults = IRoleManager::getAllVaultsCall::abi_decode_returns(&raw, true)?._0;
        debug!(count = vaults.len(), "Fetched managed vaults");
        Ok(vaults)
    }
}

#[async_trait]
impl VaultReader for EvmGateway {
    async fn default_queue(&self, vault: Address) -> Result<Vec<Address>, GatewayError> {
        let data = IVault::get_default_queueCall {}.abi_encode();
        let raw = self.sender.call(None, vault, Bytes::from(data)).await?;
        Ok(IVault::get_default_queueCall::abi_decode_returns(&raw, true)?._0)
    }
}

#[async_trait]
impl KeeperContract for EvmGateway {
    async fn should(
        &self,
        action: KeeperAction,
        target: &VaultTarget,
    ) -> Result<bool, GatewayError> {
        let raw = self
            .sender
            .call(None, self.keeper, predicate_calldata(action, target))
            .await?;
        decode_predicate(action, &raw)
    }

    async fn simulate(&self, call: &KeeperCall) -> Result<(), GatewayError> {
        self.sender
            .call(Some(self.signer.address()), self.keeper, call.calldata())
            .await?;
        Ok(())
    }

    async fn submit(&self, call: &KeeperCall) -> Result<TxConfirmation, GatewayError> {
        info!(
            action = %call.action,
            vault = %call.target.vault,
            strategy = %call.target.strategy,
            "Submitting keeper transaction"
        );
        self.sender
            .send(&self.signer, self.keeper, call.calldata())
            .await
    }
}
