//! Helmsman Kube - helm and Kubernetes integration for Helmsman
//!
//! This crate provides:
//! - **Command Builder**: The exact `helm upgrade` / `helm delete` argv for a release
//! - **Command Runner**: Executes helm as a child process, echoing it in verbose mode
//! - **Namespaces**: Ensures the target namespace exists before every deploy
//! - **Release Client**: Memoized dry-run evaluation with Job, hook and Deployment views
//! - **Mocks**: In-memory runner and namespace client for tests without a cluster

pub mod client;
pub mod command;
pub mod error;
pub mod mock;
pub mod namespace;
pub mod shell;

pub use client::ReleaseClient;
pub use command::{HelmCommand, IMAGE_VERSION_KEY, Invocation, NAMESPACE_KEY, REPO_KEY};
pub use error::{KubeError, Result};
pub use mock::{MockNamespaces, MockRunner, NamespaceCounts, RecordedCall};
pub use namespace::{KubeNamespaces, NamespaceClient};
pub use shell::{CommandOutput, CommandRunner, HostRunner};
