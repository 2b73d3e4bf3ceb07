//! Random trade selection.

use alloy::primitives::U256;
use rand::Rng;
use std::fmt;

/// Direction of a fuzz trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Deposit,
    Redeem,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Deposit => write!(f, "deposit"),
            TradeKind::Redeem => write!(f, "redeem"),
        }
    }
}

/// Picks a vault index and a trade direction, both uniformly.
///
/// Returns `None` when there is no vault to trade against.
pub fn choose_trade<R: Rng>(rng: &mut R, vault_count: usize) -> Option<(usize, TradeKind)> {
    if vault_count == 0 {
        return None;
    }
    let vault = rng.random_range(0..vault_count);
    let kind = if rng.random_bool(0.5) {
        TradeKind::Deposit
    } else {
        TradeKind::Redeem
    };
    Some((vault, kind))
}

/// Picks an amount uniformly in `[0, balance]`. A zero balance yields `None`.
pub fn pick_amount<R: Rng>(rng: &mut R, balance: U256) -> Option<U256> {
    if balance.is_zero() {
        return None;
    }
    if let Ok(small) = u128::try_from(balance) {
        return Some(U256::from(rng.random_range(0..=small)));
    }

    let raw = U256::from_limbs([rng.random(), rng.random(), rng.random(), rng.random()]);
    Some(match balance.checked_add(U256::from(1u8)) {
        Some(span) => raw % span,
        None => raw,
    })
}
