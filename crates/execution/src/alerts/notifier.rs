use super::{Alert, AlertLevel};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

/// Delivery channel for alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> anyhow::Result<()>;
}

/// Writes alerts to the tracing log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> anyhow::Result<()> {
        match alert.level {
            AlertLevel::Info => info!(alert = %alert.render(), "Alert"),
            AlertLevel::Warning => warn!(alert = %alert.render(), "Alert"),
            AlertLevel::Critical => error!(alert = %alert.render(), "Alert"),
        }
        Ok(())
    }
}

/// Posts alerts as JSON to a chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("building webhook client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Body accepted by Slack and Discord style webhooks.
    pub fn payload(alert: &Alert) -> serde_json::Value {
        let text = alert.render();
        json!({
            "text": text,
            "content": text,
            "level": alert.level,
            "timestamp": alert.timestamp.to_rfc3339(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&Self::payload(alert))
            .send()
            .await
            .context("posting alert")?
            .error_for_status()
            .context("webhook rejected alert")?;
        Ok(())
    }
}

/// Fans an alert out to several notifiers. Every notifier is tried; the
/// first failure is returned.
#[derive(Default, Clone)]
pub struct MultiNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl MultiNotifier {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notifier.
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Number of notifiers.
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// True when no notifier is registered.
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    async fn notify(&self, alert: &Alert) -> anyhow::Result<()> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(err) = notifier.notify(alert).await {
                warn!(error = %err, "Notifier failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Keeps alerts in memory. Useful in tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingNotifier {
    /// Alerts received so far.
    pub fn sent(&self) -> Vec<Alert> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &Alert) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("alert buffer poisoned"))?
            .push(alert.clone());
        Ok(())
    }
}
