use super::bindings::IEverlongStrategyKeeper;
use crate::error::GatewayError;
use alloy::primitives::Bytes;
use alloy::sol_types::SolCall;
use everlong_domain::{KeeperAction, TendConfig, VaultTarget};

/// A maintenance call ready to be simulated or submitted to the keeper contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperCall {
    /// Which maintenance function.
    pub action: KeeperAction,
    /// Pair it applies to.
    pub target: VaultTarget,
    /// Only used by `tend` and `strategyReport`.
    pub config: TendConfig,
}

impl KeeperCall {
    /// Creates a new call.
    pub fn new(action: KeeperAction, target: VaultTarget, config: TendConfig) -> Self {
        Self {
            action,
            target,
            config,
        }
    }

    /// ABI-encoded calldata for the keeper contract.
    pub fn calldata(&self) -> Bytes {
        let VaultTarget { vault, strategy } = self.target;
        let encoded = match self.action {
            KeeperAction::UpdateDebt => IEverlongStrategyKeeper::updateDebtCall {
                _vault: vault,
                _strategy: strategy,
            }
            .abi_encode(),
            KeeperAction::Tend => IEverlongStrategyKeeper::tendCall {
                _strategy: strategy,
                _config: to_binding(&self.config),
            }
            .abi_encode(),
            KeeperAction::StrategyReport => IEverlongStrategyKeeper::strategyReportCall {
                _strategy: strategy,
                _config: to_binding(&self.config),
            }
            .abi_encode(),
            KeeperAction::ProcessReport => IEverlongStrategyKeeper::processReportCall {
                _vault: vault,
                _strategy: strategy,
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

/// Calldata for the view function gating `action`.
pub fn predicate_calldata(action: KeeperAction, target: &VaultTarget) -> Bytes {
    let VaultTarget { vault, strategy } = *target;
    let encoded = match action {
        KeeperAction::UpdateDebt => IEverlongStrategyKeeper::shouldUpdateDebtCall {
            _vault: vault,
            _strategy: strategy,
        }
        .abi_encode(),
        KeeperAction::Tend => {
            IEverlongStrategyKeeper::shouldTendCall { _strategy: strategy }.abi_encode()
        }
        KeeperAction::StrategyReport => {
            IEverlongStrategyKeeper::shouldStrategyReportCall { _strategy: strategy }.abi_encode()
        }
        KeeperAction::ProcessReport => IEverlongStrategyKeeper::shouldProcessReportCall {
            _vault: vault,
            _strategy: strategy,
        }
        .abi_encode(),
    };
    Bytes::from(encoded)
}

/// Decodes the boolean returned by the view function gating `action`.
pub fn decode_predicate(action: KeeperAction, data: &[u8]) -> Result<bool, GatewayError> {
    let value = match action {
        KeeperAction::UpdateDebt => {
            IEverlongStrategyKeeper::shouldUpdateDebtCall::abi_decode_returns(data, true)?._0
        }
        KeeperAction::Tend => {
            IEverlongStrategyKeeper::shouldTendCall::abi_decode_returns(data, true)?._0
        }
        KeeperAction::StrategyReport => {
            IEverlongStrategyKeeper::shouldStrategyReportCall::abi_decode_returns(data, true)?._0
        }
        KeeperAction::ProcessReport => {
            IEverlongStrategyKeeper::shouldProcessReportCall::abi_decode_returns(data, true)?._0
        }
    };
    Ok(value)
}

fn to_binding(config: &TendConfig) -> IEverlongStrategyKeeper::TendConfig {
    IEverlongStrategyKeeper::TendConfig {
        minOutput: config.min_output,
        minVaultSharePrice: config.min_vault_share_price,
        positionClosureLimit: config.position_closure_limit,
        extraData: config.extra_data.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolValue;

    fn target() -> VaultTarget {
        VaultTarget::new(Address::repeat_byte(0x11), Address::repeat_byte(0x22))
    }

    #[test]
    fn test_calldata_selectors() {
        let config = TendConfig::default();
        let cases = [
            (
                KeeperAction::UpdateDebt,
                IEverlongStrategyKeeper::updateDebtCall::SELECTOR,
            ),
            (KeeperAction::Tend, IEverlongStrategyKeeper::tendCall::SELECTOR),
            (
                KeeperAction::StrategyReport,
                IEverlongStrategyKeeper::strategyReportCall::SELECTOR,
            ),
            (
                KeeperAction::ProcessReport,
                IEverlongStrategyKeeper::processReportCall::SELECTOR,
            ),
        ];

        for (action, selector) in cases {
            let data = KeeperCall::new(action, target(), config.clone()).calldata();
            assert_eq!(&data[..4], &selector[..], "selector mismatch for {action}");
        }
    }

    #[test]
    fn test_tend_carries_config() {
        let config = TendConfig {
            position_closure_limit: U256::from(5u64),
            ..Default::default()
        };
        let data = KeeperCall::new(KeeperAction::Tend, target(), config).calldata();
        let decoded = IEverlongStrategyKeeper::tendCall::abi_decode(&data, true).unwrap();

        assert_eq!(decoded._strategy, target().strategy);
        assert_eq!(decoded._config.positionClosureLimit, U256::from(5u64));
        assert!(decoded._config.extraData.is_empty());
    }

    #[test]
    fn test_predicate_calldata_targets_strategy_only_for_tend() {
        let data = predicate_calldata(KeeperAction::Tend, &target());
        let decoded = IEverlongStrategyKeeper::shouldTendCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded._strategy, target().strategy);

        let data = predicate_calldata(KeeperAction::ProcessReport, &target());
        let decoded =
            IEverlongStrategyKeeper::shouldProcessReportCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded._vault, target().vault);
        assert_eq!(decoded._strategy, target().strategy);
    }

    #[test]
    fn test_decode_predicate() {
        let encoded = true.abi_encode();
        assert!(decode_predicate(KeeperAction::StrategyReport, &encoded).unwrap());

        let encoded = false.abi_encode();
        assert!(!decode_predicate(KeeperAction::UpdateDebt, &encoded).unwrap());

        let err = decode_predicate(KeeperAction::Tend, &[]).unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
