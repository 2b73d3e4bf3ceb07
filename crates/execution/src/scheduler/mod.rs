//! Reconciliation loop.
//!
//! A [`Keeper`] runs one pass per tick:
//! - discover the managed (vault, strategy) pairs
//! - read the four action predicates for each pair
//! - submit the actions whose predicates are true, in priority order
//!
//! Pairs are processed sequentially. A pair-level failure is logged and the
//! loop moves on; a [`KeeperError`] stops it.

use crate::error::KeeperError;
use crate::strategy::{ActionExecutor, ExecutorConfig, PredicateEvaluator};
use crate::sync::VaultDiscovery;
use everlong_domain::{PairReport, TickReport};
use everlong_protocols::{KeeperContract, VaultManager, VaultReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Loop timing.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    /// Pause between the end of one tick and the start of the next.
    pub check_period: Duration,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            check_period: Duration::from_secs(3600),
        }
    }
}

/// The keeper bot.
pub struct Keeper {
    /// Vault and strategy discovery.
    discovery: VaultDiscovery,
    /// Predicate reads.
    evaluator: PredicateEvaluator,
    /// Action submission.
    executor: ActionExecutor,
    /// Loop timing.
    config: KeeperConfig,
    /// Running flag.
    running: AtomicBool,
    /// Cuts the sleep short on stop.
    wake: Notify,
}

impl Keeper {
    /// Creates a keeper from its three stages.
    pub fn new(
        discovery: VaultDiscovery,
        evaluator: PredicateEvaluator,
        executor: ActionExecutor,
        config: KeeperConfig,
    ) -> Self {
        Self {
            discovery,
            evaluator,
            executor,
            config,
            running: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Wires every stage to a single gateway.
    pub fn from_gateway<G>(gateway: Arc<G>, executor: ExecutorConfig, config: KeeperConfig) -> Self
    where
        G: VaultManager + VaultReader + KeeperContract + 'static,
    {
        let manager: Arc<dyn VaultManager> = gateway.clone();
        let reader: Arc<dyn VaultReader> = gateway.clone();
        let keeper: Arc<dyn KeeperContract> = gateway;

        Self::new(
            VaultDiscovery::new(manager, reader),
            PredicateEvaluator::new(keeper.clone()),
            ActionExecutor::new(keeper, executor),
            config,
        )
    }

    /// Returns true while [`Keeper::run`] is looping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Asks a running loop to return after the current tick.
    pub fn stop(&self) {
        info!("Stopping keeper");
        self.running.store(false, Ordering::SeqCst);
        // Stores a permit if the loop is between ticks and not yet waiting.
        self.wake.notify_one();
    }

    /// Runs a single reconciliation pass.
    pub async fn tick(&self) -> Result<TickReport, KeeperError> {
        let targets = self.discovery.discover().await?;
        info!(pairs = targets.len(), "Starting keeper tick");

        let mut report = TickReport::default();
        for target in targets {
            let predicates = match self.evaluator.evaluate(&target).await {
                Ok(predicates) => predicates,
                Err(err) => {
                    warn!(
                        vault = %target.vault,
                        strategy = %target.strategy,
                        error = %err,
                        "Skipping pair for this tick"
                    );
                    report.pairs.push(PairReport::abandoned(target, err.to_string()));
                    continue;
                }
            };

            let outcomes = self.executor.apply(&target, &predicates).await?;
            report
                .pairs
                .push(PairReport::processed(target, predicates, outcomes));
        }

        info!(
            pairs = report.pairs.len(),
            submitted = report.submitted(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            abandoned = report.abandoned(),
            "Keeper tick complete"
        );
        Ok(report)
    }

    /// Ticks until a fatal error or [`Keeper::stop`].
    pub async fn run(&self) -> Result<(), KeeperError> {
        self.running.store(true, Ordering::SeqCst);
        info!(
            check_period_secs = self.config.check_period.as_secs(),
            "Starting keeper loop"
        );

        while self.is_running() {
            info!("Checking for running keeper...");
            if let Err(err) = self.tick().await {
                error!(error = %err, "Keeper loop terminated");
                self.running.store(false, Ordering::SeqCst);
                return Err(err);
            }

            if !self.is_running() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.config.check_period) => {}
                _ = self.wake.notified() => {}
            }
        }

        info!("Keeper loop stopped");
        Ok(())
    }
}
