use crate::config::{DeploySettings, Env, FuzzSettings, KeeperSettings};
use alloy::primitives::U256;
use anyhow::{Context, Result};
use everlong_deploy::local_chain::set_balance;
use everlong_deploy::{DeployConfig, LocalChain, deploy_everlong};
use everlong_execution::scheduler::{Keeper, KeeperConfig};
use everlong_execution::strategy::ExecutorConfig;
use everlong_protocols::everlong::{EvmGateway, GatewayConfig, parse_signer};
use everlong_protocols::rpc::RpcConfig;
use everlong_protocols::transaction::TransactionSender;
use everlong_simulation::{FuzzConfig, VaultFuzzer, resolve_vaults};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// ETH given to the keeper identity on a fork.
const FORK_KEEPER_BALANCE: u128 = 100_000_000_000_000_000_000;

/// Runs the keeper loop until Ctrl-C or a fatal error.
pub async fn keeper<F: Fn(&str) -> Option<String>>(
    env: &Env<F>,
    check_period: u64,
    dry_run_first: bool,
) -> Result<()> {
    let settings = KeeperSettings::load(env)?;
    let signer = parse_signer(&settings.private_key)?;
    let gateway = EvmGateway::connect(
        GatewayConfig {
            rpc: RpcConfig::new(settings.rpc_uri.clone()),
            keeper: settings.keeper,
            role_manager: settings.role_manager,
        },
        signer,
    )
    .await
    .context("connecting keeper gateway")?;

    let keeper = Arc::new(Keeper::from_gateway(
        Arc::new(gateway),
        ExecutorConfig {
            dry_run_first,
            ..Default::default()
        },
        KeeperConfig {
            check_period: Duration::from_secs(check_period),
        },
    ));

    tokio::spawn({
        let keeper = keeper.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                keeper.stop();
            }
        }
    });

    keeper.run().await?;
    Ok(())
}

/// Deploys the contracts and prints their addresses as JSON.
pub async fn deploy<F: Fn(&str) -> Option<String>>(
    env: &Env<F>,
    num_vaults: usize,
    clean_dirs: bool,
) -> Result<()> {
    let settings = DeploySettings::load(env)?;
    let deployed = deploy_everlong(&DeployConfig {
        rpc_uri: settings.rpc_uri,
        hyperdrive: settings.hyperdrive,
        everlong_path: settings.everlong_path,
        num_vaults,
        clean_dirs,
    })
    .await?;

    println!("{}", serde_json::to_string_pretty(&deployed)?);
    Ok(())
}

/// Command line options for [`fuzz`].
pub struct FuzzOptions {
    /// Number of trading agents.
    pub num_agents: usize,
    /// Strategy/vault pairs to deploy.
    pub num_vaults: usize,
    /// RNG seed.
    pub seed: u64,
    /// Iteration limit. `None` runs until an error.
    pub iterations: Option<u64>,
    /// Anvil port.
    pub port: u16,
}

/// Forks the chain, deploys, and fuzzes the vaults with the keeper running.
pub async fn fuzz<F: Fn(&str) -> Option<String>>(env: &Env<F>, options: FuzzOptions) -> Result<()> {
    let settings = FuzzSettings::load(env)?;
    let signer = parse_signer(&settings.private_key)?;

    let chain = LocalChain::fork(&settings.deploy.rpc_uri, options.port).await?;
    let deployed = deploy_everlong(&DeployConfig {
        rpc_uri: chain.rpc_uri().to_string(),
        hyperdrive: settings.deploy.hyperdrive,
        everlong_path: settings.deploy.everlong_path,
        num_vaults: options.num_vaults,
        clean_dirs: true,
    })
    .await?;

    set_balance(chain.provider(), signer.address(), U256::from(FORK_KEEPER_BALANCE)).await?;
    let gateway = EvmGateway::with_provider(
        chain.provider().clone(),
        deployed.keeper,
        Some(deployed.role_manager),
        signer,
    )
    .await?;
    let keeper = Keeper::from_gateway(
        Arc::new(gateway),
        ExecutorConfig::default(),
        KeeperConfig::default(),
    );

    let sender = TransactionSender::new(chain.provider().clone());
    let vaults = resolve_vaults(&sender, &deployed.vaults).await?;

    info!(seed = options.seed, "Fuzzing with seed");
    let mut fuzzer = VaultFuzzer::new(
        sender,
        keeper,
        vaults,
        FuzzConfig {
            num_agents: options.num_agents,
            seed: options.seed,
            iterations: options.iterations,
            ..Default::default()
        },
    )?;
    fuzzer.run().await?;
    Ok(())
}
