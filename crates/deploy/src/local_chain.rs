//! Forked anvil node and its cheatcodes.

use crate::error::DeployError;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use everlong_protocols::GatewayError;
use everlong_protocols::rpc::{HttpProvider, RpcConfig, connect_http, raw_request};
use serde_json::json;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info};

const READY_ATTEMPTS: usize = 50;
const READY_POLL: Duration = Duration::from_millis(200);

/// An anvil process forking a remote chain. The process is killed on drop.
pub struct LocalChain {
    _child: Child,
    rpc: RpcConfig,
    provider: HttpProvider,
}

impl LocalChain {
    /// Spawns `anvil --fork-url <fork_url> --port <port>` and waits for its
    /// RPC endpoint to answer.
    pub async fn fork(fork_url: &str, port: u16) -> Result<Self, DeployError> {
        let child = Command::new("anvil")
            .args(["--fork-url", fork_url, "--port", &port.to_string(), "--silent"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DeployError::Spawn {
                program: "anvil".to_string(),
                source,
            })?;

        let rpc = RpcConfig::new(format!("http://127.0.0.1:{port}"));
        let provider = connect_http(&rpc)?;
        wait_until_ready(&provider, &rpc.url).await?;
        info!(url = %rpc.url, "Local fork ready");

        Ok(Self {
            _child: child,
            rpc,
            provider,
        })
    }

    /// Endpoint of the fork.
    pub fn rpc_uri(&self) -> &str {
        &self.rpc.url
    }

    /// Provider connected to the fork.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }
}

async fn wait_until_ready(provider: &HttpProvider, url: &str) -> Result<(), DeployError> {
    for attempt in 0..READY_ATTEMPTS {
        match provider.get_chain_id().await {
            Ok(chain_id) => {
                debug!(chain_id, attempt, "Anvil answered");
                return Ok(());
            }
            Err(_) => tokio::time::sleep(READY_POLL).await,
        }
    }
    Err(DeployError::ChainNotReady {
        url: url.to_string(),
    })
}

/// Sets the ETH balance of `account`.
pub async fn set_balance(
    provider: &HttpProvider,
    account: Address,
    wei: U256,
) -> Result<(), GatewayError> {
    raw_request(provider, "anvil_setBalance", json!([account, wei])).await?;
    Ok(())
}

/// Lets unsigned transactions from `account` through.
pub async fn impersonate(provider: &HttpProvider, account: Address) -> Result<(), GatewayError> {
    raw_request(provider, "anvil_impersonateAccount", json!([account])).await?;
    Ok(())
}

/// Ends an impersonation started with [`impersonate`].
pub async fn stop_impersonating(
    provider: &HttpProvider,
    account: Address,
) -> Result<(), GatewayError> {
    raw_request(provider, "anvil_stopImpersonatingAccount", json!([account])).await?;
    Ok(())
}

/// Moves the chain clock forward and mines a block at the new time.
pub async fn advance_time(provider: &HttpProvider, seconds: u64) -> Result<(), GatewayError> {
    raw_request(provider, "evm_increaseTime", json!([seconds])).await?;
    raw_request(provider, "evm_mine", json!([])).await?;
    debug!(seconds, "Advanced chain time");
    Ok(())
}
