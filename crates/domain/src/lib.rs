//! Core types shared by the Everlong keeper, deployment and fuzzing bots.

pub mod entities;
pub mod enums;
pub mod value_objects;

pub use entities::{PairReport, TickReport, VaultTarget};
pub use enums::KeeperAction;
pub use value_objects::{ActionOutcome, ActionPredicates, TendConfig, TxConfirmation};
