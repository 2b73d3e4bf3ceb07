//! Vault fuzz loop.
//!
//! Each iteration every agent makes one random deposit or redeem, the keeper
//! runs one tick, and the chain clock moves forward.

use crate::agent::{FuzzAgent, Funding, fund_agent};
use crate::error::FuzzError;
use crate::ignore::is_ignorable_revert;
use crate::trade::{TradeKind, choose_trade, pick_amount};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use everlong_deploy::local_chain::advance_time;
use everlong_domain::TickReport;
use everlong_execution::scheduler::Keeper;
use everlong_protocols::GatewayError;
use everlong_protocols::everlong::bindings::{IERC20, IVault};
use everlong_protocols::transaction::TransactionSender;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

/// Fuzz run settings.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Number of trading agents.
    pub num_agents: usize,
    /// Seed for agent keys and trade choices.
    pub seed: u64,
    /// Stop after this many iterations. `None` runs until an error.
    pub iterations: Option<u64>,
    /// Chain time added after each iteration.
    pub advance_secs: u64,
    /// Where agent balances come from.
    pub funding: Funding,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            num_agents: 4,
            seed: 0,
            iterations: None,
            advance_secs: 60 * 60 * 24,
            funding: Funding::default(),
        }
    }
}

/// A vault under fuzz and the token it takes deposits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzVault {
    /// Vault address. Its shares are what redeems spend.
    pub address: Address,
    /// Token read from the vault's `asset()`.
    pub asset: Address,
}

impl FuzzVault {
    /// Token whose balance bounds a trade of `kind`.
    pub fn balance_token(&self, kind: TradeKind) -> Address {
        match kind {
            TradeKind::Deposit => self.asset,
            TradeKind::Redeem => self.address,
        }
    }
}

/// Reads each vault's `asset()`.
pub async fn resolve_vaults(
    sender: &TransactionSender,
    vaults: &[Address],
) -> Result<Vec<FuzzVault>, GatewayError> {
    let mut resolved = Vec::with_capacity(vaults.len());
    for &address in vaults {
        let data = IVault::assetCall {}.abi_encode();
        let raw = sender.call(None, address, Bytes::from(data)).await?;
        let asset = IVault::assetCall::abi_decode_returns(&raw, true)?._0;
        info!(vault = %address, asset = %asset, "Resolved vault asset");
        resolved.push(FuzzVault { address, asset });
    }
    Ok(resolved)
}

/// Distinct vault assets, in first-seen order.
pub fn distinct_assets(vaults: &[FuzzVault]) -> Vec<Address> {
    let mut assets: Vec<Address> = Vec::new();
    for vault in vaults {
        if !assets.contains(&vault.asset) {
            assets.push(vault.asset);
        }
    }
    assets
}

/// Outcome of one trade attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
    /// The trade was mined.
    Executed {
        kind: TradeKind,
        vault: Address,
        amount: U256,
    },
    /// Nothing to trade with.
    Skipped { kind: TradeKind, vault: Address },
    /// Reverted with an expected reason.
    Ignored { kind: TradeKind, reason: String },
}

/// What one fuzz iteration did.
#[derive(Debug, Clone)]
pub struct IterationReport {
    /// One entry per agent.
    pub trades: Vec<TradeOutcome>,
    /// The keeper tick that followed the trades.
    pub tick: TickReport,
}

/// Drives random trades against the vaults while the keeper maintains them.
pub struct VaultFuzzer {
    sender: TransactionSender,
    keeper: Keeper,
    vaults: Vec<FuzzVault>,
    agents: Vec<FuzzAgent>,
    rng: StdRng,
    config: FuzzConfig,
}

impl VaultFuzzer {
    /// Creates a fuzzer with `config.num_agents` agents derived from the seed.
    pub fn new(
        sender: TransactionSender,
        keeper: Keeper,
        vaults: Vec<FuzzVault>,
        config: FuzzConfig,
    ) -> Result<Self, FuzzError> {
        if vaults.is_empty() {
            return Err(FuzzError::NoVaults);
        }
        let mut rng = StdRng::seed_from_u64(config.seed);
        let agents = (0..config.num_agents)
            .map(|_| FuzzAgent::generate(&mut rng))
            .collect();
        Ok(Self {
            sender,
            keeper,
            vaults,
            agents,
            rng,
            config,
        })
    }

    /// Gives every agent gas and its budget of each vault asset.
    pub async fn fund_agents(&self) -> Result<(), FuzzError> {
        let assets = distinct_assets(&self.vaults);
        for agent in &self.agents {
            fund_agent(&self.sender, &self.config.funding, &assets, agent).await?;
        }
        Ok(())
    }

    /// Funds the agents and iterates until the configured count or an error.
    pub async fn run(&mut self) -> Result<(), FuzzError> {
        info!(
            agents = self.agents.len(),
            vaults = self.vaults.len(),
            seed = self.config.seed,
            "Starting vault fuzzing"
        );
        self.fund_agents().await?;

        let mut iteration = 0u64;
        while self.config.iterations.is_none_or(|limit| iteration < limit) {
            info!(iteration, "Running fuzz bots...");
            let report = self.iterate().await?;
            let executed = report
                .trades
                .iter()
                .filter(|t| matches!(t, TradeOutcome::Executed { .. }))
                .count();
            info!(
                iteration,
                executed,
                keeper_submissions = report.tick.submitted(),
                "Fuzz iteration complete"
            );
            iteration += 1;
        }
        Ok(())
    }

    /// One round of trades, one keeper tick, then a clock advance.
    pub async fn iterate(&mut self) -> Result<IterationReport, FuzzError> {
        let mut trades = Vec::with_capacity(self.agents.len());
        for index in 0..self.agents.len() {
            trades.push(self.trade(index).await?);
        }

        let tick = self.keeper.tick().await?;
        advance_time(self.sender.provider(), self.config.advance_secs).await?;

        Ok(IterationReport { trades, tick })
    }

    async fn trade(&mut self, index: usize) -> Result<TradeOutcome, FuzzError> {
        let Some((vault_index, kind)) = choose_trade(&mut self.rng, self.vaults.len()) else {
            return Err(FuzzError::NoVaults);
        };
        let target = self.vaults[vault_index];
        let vault = target.address;
        let agent = self.agents[index].clone();

        let balance = self
            .balance_of(target.balance_token(kind), agent.address())
            .await?;
        let Some(amount) = pick_amount(&mut self.rng, balance) else {
            return Ok(TradeOutcome::Skipped { kind, vault });
        };

        info!(
            agent = %agent.address(),
            vault = %vault,
            action = %kind,
            amount = %amount,
            "Agent trading"
        );
        let result = match kind {
            TradeKind::Deposit => self.deposit(&agent, &target, amount).await,
            TradeKind::Redeem => self.redeem(&agent, vault, amount).await,
        };

        match result {
            Ok(()) => Ok(TradeOutcome::Executed {
                kind,
                vault,
                amount,
            }),
            Err(err) if is_ignorable_revert(&err) => {
                warn!(agent = %agent.address(), error = %err, "Ignoring expected revert");
                Ok(TradeOutcome::Ignored {
                    kind,
                    reason: err.to_string(),
                })
            }
            Err(source) => Err(FuzzError::Trade {
                action: kind.to_string(),
                agent: agent.address().to_string(),
                source,
            }),
        }
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, GatewayError> {
        let data = IERC20::balanceOfCall { owner }.abi_encode();
        let raw = self.sender.call(None, token, Bytes::from(data)).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&raw, true)?._0)
    }

    async fn deposit(
        &self,
        agent: &FuzzAgent,
        vault: &FuzzVault,
        amount: U256,
    ) -> Result<(), GatewayError> {
        let approve = IERC20::approveCall {
            spender: vault.address,
            amount,
        }
        .abi_encode();
        self.sender
            .send(&agent.signer, vault.asset, Bytes::from(approve))
            .await?;

        let deposit = IVault::depositCall {
            assets: amount,
            receiver: agent.address(),
        }
        .abi_encode();
        self.sender
            .send(&agent.signer, vault.address, Bytes::from(deposit))
            .await?;
        Ok(())
    }

    async fn redeem(
        &self,
        agent: &FuzzAgent,
        vault: Address,
        amount: U256,
    ) -> Result<(), GatewayError> {
        let redeem = IVault::redeemCall {
            shares: amount,
            receiver: agent.address(),
            owner: agent.address(),
        }
        .abi_encode();
        self.sender
            .send(&agent.signer, vault, Bytes::from(redeem))
            .await?;
        Ok(())
    }
}
