//! Operator alerts for fatal errors.

mod notifier;

pub use notifier::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Info => "INFO",
            AlertLevel::Warning => "WARNING",
            AlertLevel::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// A message for the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Severity.
    pub level: AlertLevel,
    /// Short headline.
    pub title: String,
    /// Body.
    pub message: String,
    /// Free-form key/value context such as the chain host.
    pub context: Vec<(String, String)>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Creates a new alert stamped with the current time.
    pub fn new(level: AlertLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            context: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Adds a key/value pair to the alert.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Single-line rendering used by log and webhook notifiers.
    pub fn render(&self) -> String {
        let mut text = format!("[{}] {} {}", self.level, self.title, self.message);
        for (key, value) in &self.context {
            text.push_str(&format!(" {key}={value}"));
        }
        text
    }
}

/// Prefix naming the process and chain host for an uncaught error.
pub fn fatal_prefix(bot_name: &str, chain_label: Option<&str>) -> String {
    match chain_label {
        Some(host) => format!("Uncaught Critical Error for {host} in {bot_name}:"),
        None => format!("Uncaught Critical Error in {bot_name}:"),
    }
}

/// Reports an error that is about to terminate the process.
///
/// Delivery failures are logged and swallowed so the original error is
/// always what the caller returns.
pub async fn report_fatal(
    notifier: &dyn Notifier,
    bot_name: &str,
    chain_label: Option<&str>,
    err: &anyhow::Error,
) {
    let title = fatal_prefix(bot_name, chain_label);
    let mut alert = Alert::new(AlertLevel::Critical, title, format!("{err:#}"));
    if let Some(host) = chain_label {
        alert = alert.with_context("chain", host);
    }

    if let Err(delivery) = notifier.notify(&alert).await {
        tracing::error!(error = %delivery, "Failed to deliver fatal alert");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_prefix() {
        assert_eq!(
            fatal_prefix("Everlong Bot", Some("eth.example.org")),
            "Uncaught Critical Error for eth.example.org in Everlong Bot:"
        );
        assert_eq!(
            fatal_prefix("Fuzz Everlong", None),
            "Uncaught Critical Error in Fuzz Everlong:"
        );
    }

    #[test]
    fn test_render_includes_context() {
        let alert = Alert::new(AlertLevel::Warning, "title", "body").with_context("chain", "local");
        assert_eq!(alert.render(), "[WARNING] title body chain=local");
    }

    #[tokio::test]
    async fn test_report_fatal_sends_critical_alert() {
        let notifier = RecordingNotifier::default();
        let err = anyhow::anyhow!("keeper identity rejected").context("tick failed");

        report_fatal(&notifier, "Everlong Bot", Some("127.0.0.1:8545"), &err).await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level, AlertLevel::Critical);
        assert_eq!(
            sent[0].title,
            "Uncaught Critical Error for 127.0.0.1:8545 in Everlong Bot:"
        );
        assert_eq!(sent[0].message, "tick failed: keeper identity rejected");
    }
}
