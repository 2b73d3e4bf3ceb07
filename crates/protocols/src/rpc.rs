//! JSON-RPC connection setup.

use crate::error::GatewayError;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::{Client, Http};
use std::borrow::Cow;
use tracing::debug;

/// Provider type used for every HTTP connection in the workspace.
pub type HttpProvider = RootProvider<Http<Client>>;

/// Connection settings for a JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Endpoint URL.
    pub url: String,
}

impl RpcConfig {
    /// Creates a config for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Host portion of the URL, used to label logs and alerts.
    ///
    /// `https://eth.example.org/v2/key` becomes `eth.example.org`.
    pub fn chain_label(&self) -> &str {
        chain_label(&self.url)
    }
}

/// Host portion of an RPC URL.
pub fn chain_label(url: &str) -> &str {
    let without_scheme = url.rsplit("//").next().unwrap_or(url);
    without_scheme.split('/').next().unwrap_or(without_scheme)
}

/// Opens an HTTP provider. No request is made until the first call.
pub fn connect_http(config: &RpcConfig) -> Result<HttpProvider, GatewayError> {
    let url = config
        .url
        .parse()
        .map_err(|e| GatewayError::Transport(format!("invalid rpc url {}: {e}", config.url)))?;
    debug!(host = %config.chain_label(), "Connecting to RPC endpoint");
    Ok(ProviderBuilder::new().on_http(url))
}

/// Sends a node-specific JSON-RPC method (anvil cheatcodes and friends).
pub async fn raw_request(
    provider: &HttpProvider,
    method: &'static str,
    params: serde_json::Value,
) -> Result<serde_json::Value, GatewayError> {
    provider
        .raw_request::<_, serde_json::Value>(Cow::Borrowed(method), params)
        .await
        .map_err(GatewayError::from)
}
