//! Everlong deployment pipeline.
//!
//! Deploys, in order: the role manager, the strategy keeper, one strategy per
//! vault, and the vaults themselves. Each step's address is read back from its
//! forge broadcast record.

use crate::broadcast::{BroadcastRecord, broadcast_path};
use crate::error::DeployError;
use crate::forge::{
    DEPLOY_KEEPER, DEPLOY_ROLE_MANAGER, DEPLOY_STRATEGY, DEPLOY_VAULT, ForgeRunner, ForgeScript,
    ScriptRunner,
};
use alloy::primitives::Address;
use alloy::providers::Provider;
use everlong_protocols::GatewayError;
use everlong_protocols::rpc::{RpcConfig, connect_http};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output directories the deploy scripts write into.
pub const OUTPUT_DIRS: [&str; 4] = [
    "deploy/1/roleManagers",
    "deploy/1/keeperContracts",
    "deploy/1/strategies",
    "deploy/1/vaults",
];

/// Inputs to [`deploy_everlong`].
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Chain to deploy to.
    pub rpc_uri: String,
    /// Pool every strategy wraps.
    pub hyperdrive: Address,
    /// Local everlong checkout. Required.
    pub everlong_path: Option<PathBuf>,
    /// Strategy/vault pairs.
    pub num_vaults: usize,
    /// Wipe previous deploy outputs first.
    pub clean_dirs: bool,
}

/// Addresses produced by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployedContracts {
    /// Role manager.
    pub role_manager: Address,
    /// Strategy keeper.
    pub keeper: Address,
    /// One per vault, same order as `vaults`.
    pub strategies: Vec<Address>,
    /// Deployed vaults.
    pub vaults: Vec<Address>,
}

/// Name given to strategy `index`.
pub fn strategy_name(index: usize) -> String {
    format!("everlong_strategy_{index}")
}

/// Vault symbols must be unique, so vault `i` gets `i` copies of `V`.
pub fn vault_symbol(index: usize) -> String {
    "V".repeat(index)
}

/// Every script the pipeline runs, in order.
pub fn deployment_plan(hyperdrive: Address, num_vaults: usize) -> Vec<ForgeScript> {
    let mut plan = vec![
        ForgeScript::new(DEPLOY_ROLE_MANAGER),
        ForgeScript::new(DEPLOY_KEEPER),
    ];
    for i in 0..num_vaults {
        plan.push(
            ForgeScript::new(DEPLOY_STRATEGY)
                .env("NAME", strategy_name(i))
                .env("HYPERDRIVE", hyperdrive.to_string()),
        );
    }
    for i in 0..num_vaults {
        plan.push(
            ForgeScript::new(DEPLOY_VAULT)
                .env("STRATEGY_NAME", strategy_name(i))
                .env("NAME", format!("vault_{i}"))
                .env("SYMBOL", vault_symbol(i))
                .env("CATEGORY", "0"),
        );
    }
    plan
}

/// Removes and recreates the deploy output directories.
pub fn reset_output_dirs(everlong_path: &Path) -> Result<(), DeployError> {
    for dir in OUTPUT_DIRS {
        let path = everlong_path.join(dir);
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(DeployError::Io { path, source }),
        }
        std::fs::create_dir_all(&path).map_err(|source| DeployError::Io { path, source })?;
    }
    Ok(())
}

/// Runs a deployment plan with any [`ScriptRunner`].
pub struct Deployer<R> {
    runner: R,
    everlong_path: PathBuf,
    chain_id: u64,
}

impl<R: ScriptRunner> Deployer<R> {
    /// Creates a new deployer writing under `everlong_path`.
    pub fn new(runner: R, everlong_path: impl Into<PathBuf>, chain_id: u64) -> Self {
        Self {
            runner,
            everlong_path: everlong_path.into(),
            chain_id,
        }
    }

    /// Runs one script and returns the last contract it created.
    pub async fn run_step(&self, script: &ForgeScript) -> Result<Address, DeployError> {
        self.runner.run(script).await?;
        let path = broadcast_path(&self.everlong_path, &script.script, self.chain_id);
        let record = BroadcastRecord::load(&path)?;
        let address = record
            .last_created()
            .ok_or_else(|| DeployError::NothingCreated {
                script: script.script.clone(),
            })?;
        info!(script = %script.script, address = %address, "Contract deployed");
        Ok(address)
    }

    /// Runs the whole plan and collects the addresses.
    pub async fn deploy(
        &self,
        hyperdrive: Address,
        num_vaults: usize,
    ) -> Result<DeployedContracts, DeployError> {
        let plan = deployment_plan(hyperdrive, num_vaults);
        let mut addresses = Vec::with_capacity(plan.len());
        for script in &plan {
            addresses.push(self.run_step(script).await?);
        }

        let (fixed, rest) = addresses.split_at(2);
        let (strategies, vaults) = rest.split_at(num_vaults);
        Ok(DeployedContracts {
            role_manager: fixed[0],
            keeper: fixed[1],
            strategies: strategies.to_vec(),
            vaults: vaults.to_vec(),
        })
    }
}

/// Deploys the full everlong stack against `config.rpc_uri` with forge.
pub async fn deploy_everlong(config: &DeployConfig) -> Result<DeployedContracts, DeployError> {
    let everlong_path = config
        .everlong_path
        .clone()
        .ok_or(DeployError::MissingEverlongPath)?;

    if config.clean_dirs {
        reset_output_dirs(&everlong_path)?;
    }

    let provider = connect_http(&RpcConfig::new(config.rpc_uri.clone()))?;
    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(GatewayError::from)?;
    info!(
        chain_id,
        vaults = config.num_vaults,
        path = %everlong_path.display(),
        "Deploying everlong"
    );

    let runner = ForgeRunner::new(everlong_path.clone(), config.rpc_uri.clone());
    let deployed = Deployer::new(runner, everlong_path, chain_id)
        .deploy(config.hyperdrive, config.num_vaults)
        .await?;

    info!(
        role_manager = %deployed.role_manager,
        keeper = %deployed.keeper,
        "Everlong deployed"
    );
    Ok(deployed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Writes a broadcast record for each script, creating a fresh address.
    struct FakeForge {
        root: PathBuf,
        next: Mutex<u8>,
        ran: Mutex<Vec<ForgeScript>>,
    }

    impl FakeForge {
        fn new(root: &Path) -> Self {
            Self {
                root: root.to_path_buf(),
                next: Mutex::new(0),
                ran: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScriptRunner for FakeForge {
        async fn run(&self, script: &ForgeScript) -> Result<(), DeployError> {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            let address = Address::repeat_byte(*next);
            let path = broadcast_path(&self.root, &script.script, 1);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            let body = serde_json::json!({
                "transactions": [{
                    "transactionType": "CREATE",
                    "contractAddress": address.to_string(),
                }]
            });
            std::fs::write(&path, body.to_string()).unwrap();
            self.ran.lock().unwrap().push(script.clone());
            Ok(())
        }
    }

    #[test]
    fn test_plan_order_and_env() {
        let hyperdrive = Address::repeat_byte(0xaa);
        let plan = deployment_plan(hyperdrive, 2);
        let scripts: Vec<_> = plan.iter().map(|s| s.script.as_str()).collect();
        assert_eq!(
            scripts,
            vec![
                DEPLOY_ROLE_MANAGER,
                DEPLOY_KEEPER,
                DEPLOY_STRATEGY,
                DEPLOY_STRATEGY,
                DEPLOY_VAULT,
                DEPLOY_VAULT,
            ]
        );
        assert_eq!(
            plan[3].env,
            vec![
                ("NAME".to_string(), "everlong_strategy_1".to_string()),
                ("HYPERDRIVE".to_string(), hyperdrive.to_string()),
            ]
        );
        assert!(
            plan[4]
                .env
                .contains(&("SYMBOL".to_string(), String::new()))
        );
        assert!(plan[5].env.contains(&("SYMBOL".to_string(), "V".to_string())));
    }

    #[tokio::test]
    async fn test_deployer_collects_addresses_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = Deployer::new(FakeForge::new(dir.path()), dir.path(), 1);

        let deployed = deployer.deploy(Address::ZERO, 2).await.unwrap();

        assert_eq!(deployed.role_manager, Address::repeat_byte(1));
        assert_eq!(deployed.keeper, Address::repeat_byte(2));
        assert_eq!(
            deployed.strategies,
            vec![Address::repeat_byte(3), Address::repeat_byte(4)]
        );
        assert_eq!(
            deployed.vaults,
            vec![Address::repeat_byte(5), Address::repeat_byte(6)]
        );
        assert_eq!(deployer.runner.ran.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_missing_everlong_path_fails_before_work() {
        let config = DeployConfig {
            rpc_uri: "http://127.0.0.1:1".into(),
            hyperdrive: Address::ZERO,
            everlong_path: None,
            num_vaults: 2,
            clean_dirs: true,
        };
        let err = deploy_everlong(&config).await.unwrap_err();
        assert!(matches!(err, DeployError::MissingEverlongPath));
    }

    #[test]
    fn test_reset_output_dirs_clears_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("deploy/1/vaults/old.json");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "{}").unwrap();

        reset_output_dirs(dir.path()).unwrap();

        assert!(!stale.exists());
        for sub in OUTPUT_DIRS {
            assert!(dir.path().join(sub).is_dir());
        }
    }
}
