use serde::{Deserialize, Serialize};
use std::fmt;

/// Maintenance call the keeper contract can perform on a vault/strategy pair.
///
/// Variants are declared in execution priority order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeeperAction {
    UpdateDebt,
    Tend,
    StrategyReport,
    ProcessReport,
}

impl KeeperAction {
    /// All actions, in the order they must be submitted within one tick.
    pub const PRIORITY: [KeeperAction; 4] = [
        KeeperAction::UpdateDebt,
        KeeperAction::Tend,
        KeeperAction::StrategyReport,
        KeeperAction::ProcessReport,
    ];

    /// Snake-case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeeperAction::UpdateDebt => "update_debt",
            KeeperAction::Tend => "tend",
            KeeperAction::StrategyReport => "strategy_report",
            KeeperAction::ProcessReport => "process_report",
        }
    }
}

impl fmt::Display for KeeperAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_sorted() {
        let mut sorted = KeeperAction::PRIORITY;
        sorted.sort();
        assert_eq!(sorted, KeeperAction::PRIORITY);
        assert_eq!(KeeperAction::PRIORITY[0], KeeperAction::UpdateDebt);
        assert_eq!(KeeperAction::PRIORITY[3], KeeperAction::ProcessReport);
    }

    #[test]
    fn test_display() {
        assert_eq!(KeeperAction::StrategyReport.to_string(), "strategy_report");
    }
}
