//! State synchronization with on-chain data.
//!
//! The vault set is owned by the role manager and re-read every tick.

mod discovery;

pub use discovery::*;
