//! Gateway errors and revert classification.

use alloy::primitives::Bytes;
use alloy::sol_types::{Panic, Revert, SolError};
use alloy::transports::TransportError;
use thiserror::Error;

alloy::sol! {
    error Unauthorized();
    error OwnableUnauthorizedAccount(address account);
    error AccessControlUnauthorizedAccount(address account, bytes32 neededRole);

    error InsufficientLiquidity();
    error CircuitBreakerTriggered();
    error DistributeExcessIdleFailed();
    error MinimumTransactionAmount();
    error DecreasedPresentValueWhenAddingLiquidity();
}

/// Custom errors we know how to name when they come back as raw revert data.
const KNOWN_ERRORS: [([u8; 4], &str); 8] = [
    (Unauthorized::SELECTOR, Unauthorized::SIGNATURE),
    (
        OwnableUnauthorizedAccount::SELECTOR,
        OwnableUnauthorizedAccount::SIGNATURE,
    ),
    (
        AccessControlUnauthorizedAccount::SELECTOR,
        AccessControlUnauthorizedAccount::SIGNATURE,
    ),
    (InsufficientLiquidity::SELECTOR, InsufficientLiquidity::SIGNATURE),
    (CircuitBreakerTriggered::SELECTOR, CircuitBreakerTriggered::SIGNATURE),
    (
        DistributeExcessIdleFailed::SELECTOR,
        DistributeExcessIdleFailed::SIGNATURE,
    ),
    (
        MinimumTransactionAmount::SELECTOR,
        MinimumTransactionAmount::SIGNATURE,
    ),
    (
        DecreasedPresentValueWhenAddingLiquidity::SELECTOR,
        DecreasedPresentValueWhenAddingLiquidity::SIGNATURE,
    ),
];

/// Lowercased fragments that mean the signing identity itself was refused.
/// Nothing submitted by this signer can succeed until an operator steps in.
const AUTHORIZATION_MARKERS: [&str; 9] = [
    "unauthorized",
    "not authorized",
    "not allowed",
    "!keeper",
    "not keeper",
    "only keeper",
    "insufficient funds",
    "invalid sender",
    "sender not",
];

/// Failure talking to the chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The endpoint could not be reached or returned garbage.
    #[error("transport error: {0}")]
    Transport(String),
    /// The call or transaction reverted.
    #[error("reverted: {0}")]
    Reverted(String),
    /// The keeper identity was rejected by the chain or the contract.
    #[error("signer not authorized: {0}")]
    Unauthorized(String),
    /// The contract returned data that does not match the binding.
    #[error("failed to decode contract response: {0}")]
    Decode(String),
    /// The transaction could not be signed.
    #[error("signing failed: {0}")]
    Signer(String),
}

impl GatewayError {
    /// Builds a revert error, promoting it to [`GatewayError::Unauthorized`]
    /// when the reason names an authorization failure.
    pub fn rejected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        if is_authorization_failure(&reason) {
            GatewayError::Unauthorized(reason)
        } else {
            GatewayError::Reverted(reason)
        }
    }

    /// Whether this error makes every later submission pointless.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_))
    }
}

impl From<TransportError> for GatewayError {
    /// Error responses become reverts only when they carry revert data or an
    /// `execution reverted` message. Signer rejections without revert data,
    /// such as an unfunded keeper, are still promoted. Other node faults stay
    /// transport errors.
    fn from(err: TransportError) -> Self {
        let Some(payload) = err.as_error_resp() else {
            return GatewayError::Transport(err.to_string());
        };
        if let Some(data) = payload.as_revert_data() {
            return GatewayError::rejected(decode_revert_reason(&data));
        }

        let message = payload.message.to_string();
        if message.starts_with("execution reverted") || is_authorization_failure(&message) {
            GatewayError::rejected(message)
        } else {
            GatewayError::Transport(message)
        }
    }
}

impl From<alloy::sol_types::Error> for GatewayError {
    fn from(err: alloy::sol_types::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Turns raw revert data into a readable reason.
///
/// `Error(string)` yields the string, `Panic(uint256)` yields the panic code,
/// known custom errors yield their signature, anything else the hex payload.
pub fn decode_revert_reason(data: &[u8]) -> String {
    if data.len() < 4 {
        return format!("empty revert data {}", Bytes::copy_from_slice(data));
    }

    let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];

    if selector == Revert::SELECTOR
        && let Ok(revert) = Revert::abi_decode(data, true)
    {
        return revert.reason;
    }

    if selector == Panic::SELECTOR
        && let Ok(panic) = Panic::abi_decode(data, true)
    {
        return format!("Panic({})", panic.code);
    }

    KNOWN_ERRORS
        .iter()
        .find(|(known, _)| *known == selector)
        .map(|(_, signature)| (*signature).to_string())
        .unwrap_or_else(|| format!("custom error {}", Bytes::copy_from_slice(data)))
}

fn is_authorization_failure(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    AUTHORIZATION_MARKERS
        .iter()
        .any(|marker| reason.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::{RpcError, TransportErrorKind};

    #[test]
    fn test_decode_error_string() {
        let data = Revert {
            reason: "!keeper".into(),
        }
        .abi_encode();
        assert_eq!(decode_revert_reason(&data), "!keeper");
    }

    #[test]
    fn test_decode_known_custom_error() {
        let data = InsufficientLiquidity {}.abi_encode();
        assert_eq!(decode_revert_reason(&data), "InsufficientLiquidity()");

        let data = OwnableUnauthorizedAccount {
            account: Address::repeat_byte(7),
        }
        .abi_encode();
        assert_eq!(
            decode_revert_reason(&data),
            "OwnableUnauthorizedAccount(address)"
        );
    }

    #[test]
    fn test_decode_unknown_selector() {
        let reason = decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(reason, "custom error 0xdeadbeef");
    }

    #[test]
    fn test_rejected_classification() {
        assert!(GatewayError::rejected("!keeper").is_fatal());
        assert!(GatewayError::rejected("OwnableUnauthorizedAccount(address)").is_fatal());
        assert!(
            GatewayError::rejected("insufficient funds for gas * price + value").is_fatal()
        );

        let err = GatewayError::rejected("InsufficientLiquidity()");
        assert!(!err.is_fatal());
        assert_eq!(err, GatewayError::Reverted("InsufficientLiquidity()".into()));
        assert!(!GatewayError::Transport("connection refused".into()).is_fatal());
    }

    fn error_response(message: &str, data: Option<&[u8]>) -> TransportError {
        let data = data.map(|bytes| {
            serde_json::value::to_raw_value(&Bytes::copy_from_slice(bytes).to_string()).unwrap()
        });
        RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: message.to_string().into(),
            data,
        })
    }

    #[test]
    fn test_keeper_revert_data_is_fatal() {
        let data = Revert {
            reason: "!keeper".into(),
        }
        .abi_encode();
        let err = GatewayError::from(error_response("execution reverted: !keeper", Some(&data)));
        assert_eq!(err, GatewayError::Unauthorized("!keeper".into()));
    }

    #[test]
    fn test_custom_error_revert_is_pair_local() {
        let data = InsufficientLiquidity {}.abi_encode();
        let err = GatewayError::from(error_response("execution reverted", Some(&data)));
        assert_eq!(err, GatewayError::Reverted("InsufficientLiquidity()".into()));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unfunded_signer_is_fatal() {
        let err = GatewayError::from(error_response(
            "insufficient funds for gas * price + value",
            None,
        ));
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }

    #[test]
    fn test_revert_message_without_data() {
        let err = GatewayError::from(error_response("execution reverted: !keeper", None));
        assert_eq!(
            err,
            GatewayError::Unauthorized("execution reverted: !keeper".into())
        );
    }

    #[test]
    fn test_node_fault_is_transport() {
        let err = GatewayError::from(error_response("header not found", None));
        assert_eq!(err, GatewayError::Transport("header not found".into()));

        let err = GatewayError::from(TransportErrorKind::custom_str("connection refused"));
        assert!(matches!(err, GatewayError::Transport(_)));
        assert!(!err.is_fatal());
    }
}
