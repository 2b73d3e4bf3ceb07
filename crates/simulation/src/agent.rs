//! Fuzz trading agents and their funding.

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use everlong_deploy::local_chain::{impersonate, set_balance, stop_impersonating};
use everlong_protocols::GatewayError;
use everlong_protocols::everlong::bindings::IERC20;
use everlong_protocols::transaction::TransactionSender;
use rand::Rng;
use tracing::{info, warn};

/// Mainnet DAI.
pub const DAI_ADDRESS: Address = alloy::primitives::address!("6B175474E89094C44Da98b954EedeAC495271d0F");
/// Large DAI holder used to fund agents on a fork.
pub const DAI_WHALE: Address = alloy::primitives::address!("f6e72Db5454dd049d0788e411b06CfAF16853042");

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// A trading account with a locally held key.
#[derive(Debug, Clone)]
pub struct FuzzAgent {
    /// Key the agent signs its trades with.
    pub signer: PrivateKeySigner,
}

impl FuzzAgent {
    /// Derives a fresh key from `rng`, so a seed reproduces the same agents.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        loop {
            let mut key = [0u8; 32];
            rng.fill(&mut key);
            // Out-of-range scalars are rejected; draw again.
            if let Ok(signer) = PrivateKeySigner::from_bytes(&B256::from(key)) {
                return Self { signer };
            }
        }
    }

    /// The agent's account.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

/// How agents are funded.
#[derive(Debug, Clone)]
pub struct Funding {
    /// Known holders to move each vault asset from, keyed by asset.
    pub whales: Vec<(Address, Address)>,
    /// Asset amount per agent, in base units.
    pub asset_budget: U256,
    /// ETH given to each agent for gas, in wei.
    pub gas_budget: U256,
}

impl Funding {
    /// The holder to fund `asset` from, if one is known.
    pub fn whale_for(&self, asset: Address) -> Option<Address> {
        self.whales
            .iter()
            .find(|(known, _)| *known == asset)
            .map(|(_, whale)| *whale)
    }
}

impl Default for Funding {
    fn default() -> Self {
        Self {
            whales: vec![(DAI_ADDRESS, DAI_WHALE)],
            asset_budget: U256::from(1_000_000u64) * U256::from(ONE_ETHER),
            gas_budget: U256::from(100u64) * U256::from(ONE_ETHER),
        }
    }
}

/// Gives `agent` gas money and its budget of every asset in `assets`.
///
/// Assets without a known whale are left unfunded; deposits into their vaults
/// are skipped for lack of balance.
pub async fn fund_agent(
    sender: &TransactionSender,
    funding: &Funding,
    assets: &[Address],
    agent: &FuzzAgent,
) -> Result<(), GatewayError> {
    let provider = sender.provider();
    set_balance(provider, agent.address(), funding.gas_budget).await?;

    for &asset in assets {
        let Some(whale) = funding.whale_for(asset) else {
            warn!(
                asset = %asset,
                agent = %agent.address(),
                "No whale known for asset, agent left unfunded"
            );
            continue;
        };
        set_balance(provider, whale, funding.gas_budget).await?;

        impersonate(provider, whale).await?;
        let transfer = IERC20::transferCall {
            to: agent.address(),
            amount: funding.asset_budget,
        }
        .abi_encode();
        let sent = sender
            .send_as_node_account(whale, asset, Bytes::from(transfer))
            .await;
        stop_impersonating(provider, whale).await?;
        sent?;

        info!(
            agent = %agent.address(),
            asset = %asset,
            budget = %funding.asset_budget,
            "Funded agent"
        );
    }
    Ok(())
}
