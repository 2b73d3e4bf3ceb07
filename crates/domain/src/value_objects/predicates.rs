use crate::enums::KeeperAction;
use serde::{Deserialize, Serialize};

/// Result of the four keeper "should" reads for one vault/strategy pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPredicates {
    /// `shouldUpdateDebt(vault, strategy)`.
    pub needs_debt_update: bool,
    /// `shouldTend(strategy)`.
    pub needs_tend: bool,
    /// `shouldStrategyReport(strategy)`.
    pub needs_strategy_report: bool,
    /// `shouldProcessReport(vault, strategy)`.
    pub needs_process_report: bool,
}

impl ActionPredicates {
    /// Returns the predicate for `action`.
    pub fn get(&self, action: KeeperAction) -> bool {
        match action {
            KeeperAction::UpdateDebt => self.needs_debt_update,
            KeeperAction::Tend => self.needs_tend,
            KeeperAction::StrategyReport => self.needs_strategy_report,
            KeeperAction::ProcessReport => self.needs_process_report,
        }
    }

    /// Records the predicate for `action`.
    pub fn set(&mut self, action: KeeperAction, value: bool) {
        match action {
            KeeperAction::UpdateDebt => self.needs_debt_update = value,
            KeeperAction::Tend => self.needs_tend = value,
            KeeperAction::StrategyReport => self.needs_strategy_report = value,
            KeeperAction::ProcessReport => self.needs_process_report = value,
        }
    }
}
