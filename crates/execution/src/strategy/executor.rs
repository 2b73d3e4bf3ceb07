//! Keeper action executor.

use crate::error::KeeperError;
use everlong_domain::{
    ActionOutcome, ActionPredicates, KeeperAction, TendConfig, TxConfirmation, VaultTarget,
};
use everlong_protocols::{GatewayError, KeeperCall, KeeperContract};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Configuration for action execution.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Simulate each call with `eth_call` before submitting it.
    pub dry_run_first: bool,
    /// Constraints forwarded to `tend` and `strategyReport`.
    pub tend_config: TendConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run_first: true,
            tend_config: TendConfig::default(),
        }
    }
}

/// Submits the maintenance calls whose predicates are true.
pub struct ActionExecutor {
    keeper: Arc<dyn KeeperContract>,
    config: ExecutorConfig,
}

impl ActionExecutor {
    /// Creates a new action executor.
    pub fn new(keeper: Arc<dyn KeeperContract>, config: ExecutorConfig) -> Self {
        if !config.tend_config.is_unconstrained() {
            info!(config = ?config.tend_config, "Using custom tend config");
        }
        Self { keeper, config }
    }

    /// Runs the four actions for `target` in priority order.
    ///
    /// Returns one outcome per action. A failed step does not stop later
    /// steps; an authorization failure stops everything.
    pub async fn apply(
        &self,
        target: &VaultTarget,
        predicates: &ActionPredicates,
    ) -> Result<Vec<(KeeperAction, ActionOutcome)>, KeeperError> {
        let mut outcomes = Vec::with_capacity(KeeperAction::PRIORITY.len());

        for action in KeeperAction::PRIORITY {
            if !predicates.get(action) {
                outcomes.push((action, ActionOutcome::Skipped));
                continue;
            }

            let outcome = match self.execute(action, target).await {
                Ok(confirmation) => {
                    info!(
                        vault = %target.vault,
                        strategy = %target.strategy,
                        action = %action,
                        tx_hash = %confirmation.tx_hash,
                        "Keeper action confirmed"
                    );
                    ActionOutcome::Succeeded(confirmation)
                }
                Err(err) if err.is_fatal() => {
                    error!(
                        vault = %target.vault,
                        strategy = %target.strategy,
                        action = %action,
                        error = %err,
                        "Keeper identity rejected"
                    );
                    return Err(KeeperError::Unauthorized {
                        action,
                        target: *target,
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(
                        vault = %target.vault,
                        strategy = %target.strategy,
                        action = %action,
                        error = %err,
                        "Keeper action failed"
                    );
                    ActionOutcome::Failed(err.to_string())
                }
            };
            outcomes.push((action, outcome));
        }

        Ok(outcomes)
    }

    async fn execute(
        &self,
        action: KeeperAction,
        target: &VaultTarget,
    ) -> Result<TxConfirmation, GatewayError> {
        let call = KeeperCall::new(action, *target, self.config.tend_config.clone());

        if self.config.dry_run_first {
            debug!(action = %action, vault = %target.vault, "Simulating keeper call");
            self.keeper.simulate(&call).await?;
        }

        self.keeper.submit(&call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeChain, Recorded, addr};

    fn target() -> VaultTarget {
        VaultTarget::new(addr(1), addr(2))
    }

    fn all_true() -> ActionPredicates {
        ActionPredicates {
            needs_debt_update: true,
            needs_tend: true,
            needs_strategy_report: true,
            needs_process_report: true,
        }
    }

    #[tokio::test]
    async fn test_no_predicates_no_transactions() {
        let chain = Arc::new(FakeChain::new().with_vault(addr(1), addr(2)));
        let executor = ActionExecutor::new(chain.clone(), ExecutorConfig::default());

        let outcomes = executor
            .apply(&target(), &ActionPredicates::default())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|(_, o)| o.is_skipped()));
        assert!(chain.log().is_empty());
    }

    #[tokio::test]
    async fn test_debt_update_confirmed_before_tend() {
        let chain = Arc::new(FakeChain::new().with_vault(addr(1), addr(2)));
        let executor = ActionExecutor::new(chain.clone(), ExecutorConfig::default());
        let predicates = ActionPredicates {
            needs_debt_update: true,
            needs_tend: true,
            ..Default::default()
        };

        executor.apply(&target(), &predicates).await.unwrap();

        assert_eq!(
            chain.log(),
            vec![
                Recorded::Simulate(KeeperAction::UpdateDebt, target()),
                Recorded::Submit(KeeperAction::UpdateDebt, target()),
                Recorded::Simulate(KeeperAction::Tend, target()),
                Recorded::Submit(KeeperAction::Tend, target()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_step_does_not_block_later_steps() {
        let chain = Arc::new(
            FakeChain::new().with_vault(addr(1), addr(2)).failing_submit(
                KeeperAction::UpdateDebt,
                addr(1),
                GatewayError::Reverted("debt already balanced".into()),
            ),
        );
        let executor = ActionExecutor::new(chain.clone(), ExecutorConfig::default());

        let outcomes = executor.apply(&target(), &all_true()).await.unwrap();

        assert!(outcomes[0].1.is_failure());
        assert!(outcomes[1..].iter().all(|(_, o)| o.is_success()));
        let submitted: Vec<_> = chain.submissions().into_iter().map(|(a, _)| a).collect();
        assert_eq!(submitted, KeeperAction::PRIORITY.to_vec());
    }

    #[tokio::test]
    async fn test_failed_simulation_skips_submission_for_that_step() {
        let chain = Arc::new(
            FakeChain::new().with_vault(addr(1), addr(2)).failing_simulation(
                KeeperAction::Tend,
                addr(1),
                GatewayError::Reverted("InsufficientLiquidity()".into()),
            ),
        );
        let executor = ActionExecutor::new(chain.clone(), ExecutorConfig::default());

        let outcomes = executor.apply(&target(), &all_true()).await.unwrap();

        assert_eq!(
            outcomes[1],
            (
                KeeperAction::Tend,
                ActionOutcome::Failed("reverted: InsufficientLiquidity()".into())
            )
        );
        let submitted: Vec<_> = chain.submissions().into_iter().map(|(a, _)| a).collect();
        assert_eq!(
            submitted,
            vec![
                KeeperAction::UpdateDebt,
                KeeperAction::StrategyReport,
                KeeperAction::ProcessReport,
            ]
        );
    }

    #[tokio::test]
    async fn test_without_dry_run_only_submits() {
        let chain = Arc::new(FakeChain::new().with_vault(addr(1), addr(2)));
        let config = ExecutorConfig {
            dry_run_first: false,
            ..Default::default()
        };
        let executor = ActionExecutor::new(chain.clone(), config);
        let predicates = ActionPredicates {
            needs_strategy_report: true,
            ..Default::default()
        };

        executor.apply(&target(), &predicates).await.unwrap();

        assert_eq!(
            chain.log(),
            vec![Recorded::Submit(KeeperAction::StrategyReport, target())]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_aborts() {
        let chain = Arc::new(
            FakeChain::new().with_vault(addr(1), addr(2)).failing_submit(
                KeeperAction::Tend,
                addr(1),
                GatewayError::Unauthorized("!keeper".into()),
            ),
        );
        let executor = ActionExecutor::new(chain.clone(), ExecutorConfig::default());

        let err = executor.apply(&target(), &all_true()).await.unwrap_err();

        assert!(matches!(
            err,
            KeeperError::Unauthorized {
                action: KeeperAction::Tend,
                ..
            }
        ));
        let submitted: Vec<_> = chain.submissions().into_iter().map(|(a, _)| a).collect();
        assert_eq!(submitted, vec![KeeperAction::UpdateDebt, KeeperAction::Tend]);
    }
}
