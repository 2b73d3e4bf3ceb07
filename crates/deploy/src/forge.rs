//! Running forge deploy scripts from the everlong checkout.

use crate::error::DeployError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Deploys the role manager.
pub const DEPLOY_ROLE_MANAGER: &str = "script/DeployRoleManager.s.sol";
/// Deploys the strategy keeper.
pub const DEPLOY_KEEPER: &str = "script/DeployEverlongStrategyKeeper.s.sol";
/// Deploys one strategy. Reads `NAME` and `HYPERDRIVE`.
pub const DEPLOY_STRATEGY: &str = "script/DeployEverlongStrategy.s.sol";
/// Deploys one vault over a named strategy.
pub const DEPLOY_VAULT: &str = "script/DeployVault.s.sol";

/// One `forge script` invocation and the environment it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeScript {
    /// Script path, relative to the checkout.
    pub script: String,
    /// Variables set for this run only.
    pub env: Vec<(String, String)>,
}

impl ForgeScript {
    /// Creates a new script invocation with no extra environment.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            env: Vec::new(),
        }
    }

    /// Adds one environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell line run through `bash -c`.
    ///
    /// `.env` is sourced from the working directory before switching into the
    /// checkout, so keys shared with the bots are visible to forge.
    pub fn command_line(&self, everlong_path: &Path, rpc_uri: &str) -> String {
        let mut line = format!("source .env && cd {} && ", everlong_path.display());
        for (key, value) in &self.env {
            line.push_str(&format!("{key}='{value}' "));
        }
        line.push_str(&format!(
            "forge script {} --rpc-url {rpc_uri} --broadcast",
            self.script
        ));
        line
    }
}

/// Executes forge scripts.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &ForgeScript) -> Result<(), DeployError>;
}

/// Runs scripts with `bash -c` against a live RPC endpoint.
#[derive(Debug, Clone)]
pub struct ForgeRunner {
    everlong_path: PathBuf,
    rpc_uri: String,
}

impl ForgeRunner {
    /// Creates a new runner for the checkout at `everlong_path`.
    pub fn new(everlong_path: impl Into<PathBuf>, rpc_uri: impl Into<String>) -> Self {
        Self {
            everlong_path: everlong_path.into(),
            rpc_uri: rpc_uri.into(),
        }
    }
}

#[async_trait]
impl ScriptRunner for ForgeRunner {
    async fn run(&self, script: &ForgeScript) -> Result<(), DeployError> {
        let line = script.command_line(&self.everlong_path, &self.rpc_uri);
        info!(script = %script.script, "Running forge script");
        debug!(command = %line, "Forge command");

        let output = Command::new("bash")
            .arg("-c")
            .arg(&line)
            .output()
            .await
            .map_err(|source| DeployError::Spawn {
                program: "bash".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(DeployError::ScriptFailed {
                script: script.script.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
