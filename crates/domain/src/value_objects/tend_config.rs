use alloy::primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

/// Execution constraints passed along with `tend` and `strategyReport`.
///
/// The default is "no constraint": zero minimums, zero closure limit and an
/// empty payload. Operators that need tighter bounds supply their own value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendConfig {
    /// Minimum proceeds accepted when the strategy closes positions.
    pub min_output: U256,
    /// Minimum vault share price accepted when the strategy opens positions.
    pub min_vault_share_price: U256,
    /// Maximum number of matured positions closed in one call. Zero means no limit.
    pub position_closure_limit: U256,
    /// Opaque bytes forwarded to the underlying pool.
    pub extra_data: Bytes,
}

impl TendConfig {
    /// Whether every field still holds the permissive default.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.min_output.is_zero()
            && self.min_vault_share_price.is_zero()
            && self.position_closure_limit.is_zero()
            && self.extra_data.is_empty()
    }
}
