//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use helmsman_core::CoreError;
use helmsman_kube::KubeError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Release description is incomplete or invalid
    #[error("Invalid input: {message}")]
    #[diagnostic(code(helmsman::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// helm failed to start or exited unsuccessfully
    #[error("Command failed: {message}")]
    #[diagnostic(code(helmsman::cli::command))]
    Command {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Dry-run output contained a document that is not valid YAML
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(helmsman::cli::manifest),
        help("run with --debug to see the raw dry-run output")
    )]
    Manifest { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(helmsman::cli::io))]
    Io { message: String },

    /// Kubernetes API error
    #[error("Cluster error: {message}")]
    #[diagnostic(
        code(helmsman::cli::cluster),
        help("check your kubeconfig context and permissions")
    )]
    Cluster { message: String },

    /// Anything else
    #[error("{message}")]
    #[diagnostic(code(helmsman::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Command { .. } => exit_codes::COMMAND_ERROR,
            CliError::Manifest { .. } => exit_codes::MANIFEST_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ReleaseFileNotFound { .. } => {
                CliError::input_with_help(err.to_string(), "pass an existing file to --config")
            }
            CoreError::InvalidSetValue { .. } => {
                CliError::input_with_help(err.to_string(), "use --set key=value")
            }
            CoreError::MissingField { .. } => CliError::input_with_help(
                err.to_string(),
                "set it in the release file or on the command line",
            ),
            CoreError::YamlParse(_) => CliError::input(err.to_string()),
            CoreError::MalformedDocument { .. } => CliError::Manifest {
                message: err.to_string(),
            },
            CoreError::Io(_) => CliError::Io {
                message: err.to_string(),
            },
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::CommandSpawn { .. } => CliError::Command {
                message: err.to_string(),
                help: Some("check that helm is installed or pass --helm-bin".to_string()),
            },
            KubeError::CommandFailed { .. } => CliError::Command {
                message: err.to_string(),
                help: None,
            },
            KubeError::InvalidManifest(source) => source.into(),
            KubeError::InvalidConfig(message) => CliError::input(message),
            KubeError::Api(_) => CliError::Cluster {
                message: err.to_string(),
            },
            KubeError::Io(_) => CliError::Io {
                message: err.to_string(),
            },
            other => CliError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
