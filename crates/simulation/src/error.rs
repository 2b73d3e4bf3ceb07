use everlong_deploy::DeployError;
use everlong_execution::error::KeeperError;
use everlong_protocols::GatewayError;
use thiserror::Error;

/// Errors that end a fuzz run.
#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("no vaults to fuzz")]
    NoVaults,

    #[error("{action} failed for agent {agent}: {source}")]
    Trade {
        action: String,
        agent: String,
        #[source]
        source: GatewayError,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Keeper(#[from] KeeperError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}
