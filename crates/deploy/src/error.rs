use everlong_protocols::GatewayError;
use std::path::PathBuf;
use thiserror::Error;

/// Deployment and local chain errors.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("EVERLONG_PATH is not set")]
    MissingEverlongPath,

    #[error("filesystem error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{script} exited with {status}: {stderr}")]
    ScriptFailed {
        script: String,
        status: String,
        stderr: String,
    },

    #[error("invalid broadcast record {path}: {source}")]
    Broadcast {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{script} did not create any contract")]
    NothingCreated { script: String },

    #[error("local chain at {url} did not become ready")]
    ChainNotReady { url: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
