//! Error types for helmsman-kube

use thiserror::Error;

/// Result type for helmsman-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while evaluating or deploying a release
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The external command could not be started
    #[error("failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external command ran and exited unsuccessfully
    #[error("`{command}` exited with {status}\n{stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Dry-run output could not be turned into resources
    #[error("invalid manifest: {0}")]
    InvalidManifest(#[source] helmsman_core::CoreError),

    /// Invalid release configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<helmsman_core::CoreError> for KubeError {
    fn from(e: helmsman_core::CoreError) -> Self {
        match e {
            helmsman_core::CoreError::MalformedDocument { .. } => KubeError::InvalidManifest(e),
            other => KubeError::InvalidConfig(other.to_string()),
        }
    }
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 409)
    }

    /// Whether an external command was involved in the failure
    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            KubeError::CommandSpawn { .. } | KubeError::CommandFailed { .. }
        )
    }
}
