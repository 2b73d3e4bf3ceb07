pub mod report;
pub mod target;

pub use report::{PairReport, PairStatus, TickReport};
pub use target::VaultTarget;
