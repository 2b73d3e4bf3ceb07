//! Forge broadcast records.
//!
//! `forge script --broadcast` writes every sent transaction to
//! `broadcast/<script file>/<chain id>/run-latest.json`.

use crate::error::DeployError;
use alloy::primitives::Address;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A `run-latest.json` file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRecord {
    /// Transactions in broadcast order.
    #[serde(default)]
    pub transactions: Vec<BroadcastTransaction>,
}

/// One broadcast transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTransaction {
    /// `CREATE`, `CREATE2` or `CALL`.
    pub transaction_type: String,
    /// Created contract, for creations.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Contracts created by factories during a `CALL`.
    #[serde(default)]
    pub additional_contracts: Vec<AdditionalContract>,
}

/// A contract created inside another transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalContract {
    /// How it was created.
    pub transaction_type: String,
    /// Created contract.
    pub address: Address,
}

fn is_create(kind: &str) -> bool {
    matches!(kind, "CREATE" | "CREATE2")
}

impl BroadcastRecord {
    /// Reads and parses the record at `path`.
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DeployError::Broadcast {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Every contract created by the run, in broadcast order.
    pub fn created_contracts(&self) -> Vec<Address> {
        let mut created = Vec::new();
        for tx in &self.transactions {
            if is_create(&tx.transaction_type)
                && let Some(address) = tx.contract_address
            {
                created.push(address);
            }
            created.extend(
                tx.additional_contracts
                    .iter()
                    .filter(|c| is_create(&c.transaction_type))
                    .map(|c| c.address),
            );
        }
        created
    }

    /// The contract the script deployed last.
    pub fn last_created(&self) -> Option<Address> {
        self.created_contracts().last().copied()
    }
}

/// Location of the latest broadcast record for `script` on `chain_id`.
pub fn broadcast_path(everlong_path: &Path, script: &str, chain_id: u64) -> PathBuf {
    let file_name = Path::new(script)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| script.to_string());
    everlong_path
        .join("broadcast")
        .join(file_name)
        .join(chain_id.to_string())
        .join("run-latest.json")
}
