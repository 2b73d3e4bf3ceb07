use crate::entities::VaultTarget;
use crate::enums::KeeperAction;
use crate::value_objects::{ActionOutcome, ActionPredicates};
use serde::{Deserialize, Serialize};

/// What happened to one vault/strategy pair during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairStatus {
    /// Predicates were read and the executor ran. One outcome per action, in
    /// priority order.
    Processed {
        predicates: ActionPredicates,
        outcomes: Vec<(KeeperAction, ActionOutcome)>,
    },
    /// The pair was abandoned for this tick.
    Abandoned { reason: String },
}

/// What happened to one pair during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReport {
    /// The pair.
    pub target: VaultTarget,
    /// Outcomes, or why the pair was abandoned.
    pub status: PairStatus,
}

impl PairReport {
    /// Creates a report for a pair whose actions ran.
    pub fn processed(
        target: VaultTarget,
        predicates: ActionPredicates,
        outcomes: Vec<(KeeperAction, ActionOutcome)>,
    ) -> Self {
        Self {
            target,
            status: PairStatus::Processed {
                predicates,
                outcomes,
            },
        }
    }

    /// Creates a report for a pair skipped for the tick.
    pub fn abandoned(target: VaultTarget, reason: impl Into<String>) -> Self {
        Self {
            target,
            status: PairStatus::Abandoned {
                reason: reason.into(),
            },
        }
    }

    /// Outcome of `action`, if the pair was processed.
    pub fn outcome(&self, action: KeeperAction) -> Option<&ActionOutcome> {
        match &self.status {
            PairStatus::Processed { outcomes, .. } => outcomes
                .iter()
                .find(|(a, _)| *a == action)
                .map(|(_, outcome)| outcome),
            PairStatus::Abandoned { .. } => None,
        }
    }

    /// Whether the pair was skipped.
    pub fn is_abandoned(&self) -> bool {
        matches!(self.status, PairStatus::Abandoned { .. })
    }
}

/// Summary of a single reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// One report per discovered pair, in discovery order.
    pub pairs: Vec<PairReport>,
}

impl TickReport {
    /// Actions that were attempted.
    pub fn submitted(&self) -> usize {
        self.count(|o| !o.is_skipped())
    }

    /// Actions confirmed on chain.
    pub fn succeeded(&self) -> usize {
        self.count(ActionOutcome::is_success)
    }

    /// Actions that failed without stopping the tick.
    pub fn failed(&self) -> usize {
        self.count(ActionOutcome::is_failure)
    }

    /// Pairs skipped because of predicate failures.
    pub fn abandoned(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_abandoned()).count()
    }

    fn count(&self, pred: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.pairs
            .iter()
            .filter_map(|p| match &p.status {
                PairStatus::Processed { outcomes, .. } => Some(outcomes),
                PairStatus::Abandoned { .. } => None,
            })
            .flatten()
            .filter(|(_, outcome)| pred(outcome))
            .count()
    }
}
