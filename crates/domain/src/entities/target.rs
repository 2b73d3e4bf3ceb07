use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vault together with the strategy at the head of its default queue.
///
/// Only valid for the tick that discovered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultTarget {
    /// Managed vault.
    pub vault: Address,
    /// Head of the vault's default queue.
    pub strategy: Address,
}

impl VaultTarget {
    /// Creates a new target.
    pub fn new(vault: Address, strategy: Address) -> Self {
        Self { vault, strategy }
    }
}

impl fmt::Display for VaultTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vault, self.strategy)
    }
}
