//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use everlong_execution::prelude::*;
//! ```

// Alerts
pub use crate::alerts::{
    Alert, AlertLevel, LogNotifier, MultiNotifier, Notifier, RecordingNotifier, WebhookNotifier,
    fatal_prefix, report_fatal,
};

// Errors
pub use crate::error::{KeeperError, PredicateError};

// Scheduler
pub use crate::scheduler::{Keeper, KeeperConfig};

// Strategy
pub use crate::strategy::{ActionExecutor, ExecutorConfig, PredicateEvaluator};

// Sync
pub use crate::sync::{ACTIVE_STRATEGY_INDEX, VaultDiscovery};
