use everlong_protocols::GatewayError;

/// Revert reasons that are expected while fuzzing and do not stop the run.
pub const IGNORED_REVERTS: [&str; 6] = [
    "InsufficientLiquidity()",
    "CircuitBreakerTriggered()",
    "DistributeExcessIdleFailed()",
    "MinimumTransactionAmount()",
    "DecreasedPresentValueWhenAddingLiquidity()",
    "Closing the long results in fees exceeding long proceeds",
];

/// Whether `err` is a revert the fuzzer expects and skips.
pub fn is_ignorable_revert(err: &GatewayError) -> bool {
    match err {
        GatewayError::Reverted(reason) => IGNORED_REVERTS.iter().any(|known| reason.contains(known)),
        _ => false,
    }
}
