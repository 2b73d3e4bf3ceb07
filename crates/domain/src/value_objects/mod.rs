pub mod outcome;
pub mod predicates;
pub mod tend_config;

pub use outcome::{ActionOutcome, TxConfirmation};
pub use predicates::ActionPredicates;
pub use tend_config::TendConfig;
