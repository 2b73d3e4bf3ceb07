//! Environment settings.
//!
//! Values come from the process environment after `.env` is loaded. Empty
//! values count as unset.

use alloy::primitives::Address;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use zeroize::Zeroizing;

/// JSON-RPC endpoint.
pub const RPC_URI: &str = "MAINNET_RPC_URI";
/// Keeper contract address.
pub const KEEPER_CONTRACT: &str = "KEEPER_CONTRACT_ADDRESS";
/// Hex key of the keeper identity.
pub const PRIVATE_KEY: &str = "KEEPER_PRIVATE_KEY";
/// Optional role manager override.
pub const ROLE_MANAGER: &str = "ROLE_MANAGER_ADDRESS";
/// Hyperdrive pool the strategies wrap.
pub const HYPERDRIVE: &str = "HYPERDRIVE_ADDRESS";
/// Local everlong checkout.
pub const EVERLONG_PATH: &str = "EVERLONG_PATH";
/// Optional chat webhook for fatal alerts.
pub const ALERT_WEBHOOK: &str = "ALERT_WEBHOOK_URL";

/// Invalid or missing settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is not a valid address: {value}")]
    InvalidAddress { name: &'static str, value: String },
}

/// Reads settings through a lookup function so tests need not touch the
/// process environment.
pub struct Env<F> {
    lookup: F,
}

impl Env<fn(&str) -> Option<String>> {
    /// Reads from the process environment.
    pub fn process() -> Self {
        Self {
            lookup: |key| std::env::var(key).ok(),
        }
    }
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Creates a new reader over `lookup`.
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Trimmed value, `None` when unset or empty.
    pub fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Value that must be set.
    pub fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    /// Required value wiped from memory on drop.
    pub fn secret(&self, name: &'static str) -> Result<Zeroizing<String>, ConfigError> {
        self.required(name).map(Zeroizing::new)
    }

    /// Required address.
    pub fn address(&self, name: &'static str) -> Result<Address, ConfigError> {
        let value = self.required(name)?;
        parse_address(name, value)
    }

    /// Address that may be unset.
    pub fn optional_address(&self, name: &'static str) -> Result<Option<Address>, ConfigError> {
        self.optional(name)
            .map(|value| parse_address(name, value))
            .transpose()
    }
}

fn parse_address(name: &'static str, value: String) -> Result<Address, ConfigError> {
    Address::from_str(&value).map_err(|_| ConfigError::InvalidAddress { name, value })
}

/// Settings for the keeper loop.
pub struct KeeperSettings {
    /// JSON-RPC endpoint.
    pub rpc_uri: String,
    /// Keeper contract.
    pub keeper: Address,
    /// Role manager override.
    pub role_manager: Option<Address>,
    /// Keeper identity key.
    pub private_key: Zeroizing<String>,
}

impl KeeperSettings {
    /// Loads the keeper settings.
    pub fn load<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_uri: env.required(RPC_URI)?,
            keeper: env.address(KEEPER_CONTRACT)?,
            role_manager: env.optional_address(ROLE_MANAGER)?,
            private_key: env.secret(PRIVATE_KEY)?,
        })
    }
}

/// Settings for deploying the contracts.
pub struct DeploySettings {
    /// Chain to deploy to, or to fork when fuzzing.
    pub rpc_uri: String,
    /// Hyperdrive pool.
    pub hyperdrive: Address,
    /// Checked by the pipeline before it touches the filesystem.
    pub everlong_path: Option<PathBuf>,
}

impl DeploySettings {
    /// Loads the deploy settings.
    pub fn load<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_uri: env.required(RPC_URI)?,
            hyperdrive: env.address(HYPERDRIVE)?,
            everlong_path: env.optional(EVERLONG_PATH).map(PathBuf::from),
        })
    }
}

/// Settings for fuzzing on a local fork.
pub struct FuzzSettings {
    /// Fork source and deploy inputs.
    pub deploy: DeploySettings,
    /// Keeper identity key.
    pub private_key: Zeroizing<String>,
}

impl FuzzSettings {
    /// Loads the fuzz settings.
    pub fn load<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            deploy: DeploySettings::load(env)?,
            private_key: env.secret(PRIVATE_KEY)?,
        })
    }
}
