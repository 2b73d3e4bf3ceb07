use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};

/// A mined, successful keeper transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxConfirmation {
    /// Mined transaction.
    pub tx_hash: TxHash,
    /// Block it was mined in.
    pub block_number: Option<u64>,
}

/// Result of one step of the action executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The gating predicate was false; nothing was submitted.
    Skipped,
    /// The transaction was submitted and confirmed.
    Succeeded(TxConfirmation),
    /// Simulation or submission failed.
    Failed(String),
}

impl ActionOutcome {
    /// Predicate was false.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, ActionOutcome::Skipped)
    }

    /// Confirmed on chain.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded(_))
    }

    /// Attempted and failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed(_))
    }
}
