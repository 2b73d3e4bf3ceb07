//! Action predicate evaluation.

use crate::error::PredicateError;
use everlong_domain::{ActionPredicates, KeeperAction, VaultTarget};
use everlong_protocols::KeeperContract;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the keeper's "should" predicates for a pair.
pub struct PredicateEvaluator {
    keeper: Arc<dyn KeeperContract>,
}

impl PredicateEvaluator {
    /// Creates a new predicate evaluator.
    pub fn new(keeper: Arc<dyn KeeperContract>) -> Self {
        Self { keeper }
    }

    /// Reads all four predicates for `target`.
    ///
    /// Every read is attempted even if an earlier one fails. Any failure
    /// makes the whole pair fail with all failures attached.
    pub async fn evaluate(&self, target: &VaultTarget) -> Result<ActionPredicates, PredicateError> {
        let mut predicates = ActionPredicates::default();
        let mut failures = Vec::new();

        for action in KeeperAction::PRIORITY {
            match self.keeper.should(action, target).await {
                Ok(value) => predicates.set(action, value),
                Err(err) => {
                    warn!(
                        vault = %target.vault,
                        strategy = %target.strategy,
                        action = %action,
                        error = %err,
                        "Predicate read failed"
                    );
                    failures.push((action, err));
                }
            }
        }

        if !failures.is_empty() {
            return Err(PredicateError {
                target: *target,
                failures,
            });
        }

        debug!(
            vault = %target.vault,
            debt = predicates.needs_debt_update,
            tend = predicates.needs_tend,
            strategy_report = predicates.needs_strategy_report,
            process_report = predicates.needs_process_report,
            "Evaluated predicates"
        );
        Ok(predicates)
    }
}
