//! Namespace management
//!
//! Every deploy makes sure its target namespace exists first. The check and
//! the create go through [`NamespaceClient`] so the deploy sequence can be
//! tested without a cluster.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use kube::api::{Api, DeleteParams, PostParams};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{KubeError, Result};

/// Cluster operations on namespaces
#[async_trait]
pub trait NamespaceClient: Send + Sync {
    async fn namespace_exists(&self, name: &str) -> Result<bool>;

    /// Create a namespace. One that already exists is not an error.
    async fn create_namespace(&self, name: &str) -> Result<()>;

    /// Delete a namespace. One that is already gone is not an error.
    async fn delete_namespace(&self, name: &str) -> Result<()>;
}

/// Namespace client backed by the Kubernetes API
///
/// Without an explicit client, the default kubeconfig or in-cluster
/// configuration is loaded on first use, so commands that never touch a
/// namespace need no cluster access.
#[derive(Default)]
pub struct KubeNamespaces {
    api: OnceCell<Api<Namespace>>,
}

impl KubeNamespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing Kubernetes client
    pub fn with_client(client: Client) -> Self {
        Self {
            api: OnceCell::new_with(Some(Api::all(client))),
        }
    }

    async fn api(&self) -> Result<&Api<Namespace>> {
        self.api
            .get_or_try_init(|| async {
                debug!("Connecting to the cluster");
                let client = Client::try_default().await?;
                Ok::<_, KubeError>(Api::all(client))
            })
            .await
    }
}

#[async_trait]
impl NamespaceClient for KubeNamespaces {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        let found = self.api().await?.get_opt(name).await.map_err(KubeError::Api)?;
        debug!(namespace = name, exists = found.is_some(), "Checked namespace");
        Ok(found.is_some())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        match self.api().await?.create(&PostParams::default(), &namespace).await {
            Ok(_) => Ok(()),
            // Created concurrently by someone else
            Err(kube::Error::Api(e)) if e.code == 409 => {
                debug!(namespace = name, "Namespace already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        match self.api().await?.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
