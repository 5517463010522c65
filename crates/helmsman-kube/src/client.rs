//! High-level client for one helm release
//!
//! Combines the helm runner, the namespace client and the dry-run parser. The
//! dry-run output and the resource index built from it are computed at most
//! once per client, however many views are requested.

use std::collections::BTreeMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use helmsman_core::{
    Deployment, DeploySettings, Job, Release, ResourceIndex, SectionLocator,
};

use crate::command::HelmCommand;
use crate::error::{KubeError, Result};
use crate::namespace::NamespaceClient;
use crate::shell::CommandRunner;

/// Evaluates, deploys and removes one release
pub struct ReleaseClient<R: CommandRunner, N: NamespaceClient> {
    release: Release,
    settings: DeploySettings,
    runner: R,
    namespaces: N,

    /// Raw `helm upgrade --dry-run --debug` output
    evaluation: OnceCell<String>,

    /// Documents found in `evaluation`
    index: OnceCell<ResourceIndex>,
}

impl<R: CommandRunner, N: NamespaceClient> ReleaseClient<R, N> {
    pub fn new(release: Release, settings: DeploySettings, runner: R, namespaces: N) -> Self {
        Self {
            release,
            settings,
            runner,
            namespaces,
            evaluation: OnceCell::new(),
            index: OnceCell::new(),
        }
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    /// Command builder bound to this release and settings
    pub fn command(&self) -> HelmCommand<'_> {
        HelmCommand::new(&self.release, &self.settings)
    }

    // ========== Evaluation ==========

    /// Dry-run output of the release, produced by a single helm invocation
    ///
    /// A failed evaluation is not cached; the next call tries again.
    pub async fn evaluate(&self) -> Result<&str> {
        let output = self
            .evaluation
            .get_or_try_init(|| async {
                let invocation = self.command().evaluate();
                debug!(release = self.release.name(), "Evaluating release");
                let output = self.runner.run(&invocation, false).await?;
                Ok::<_, KubeError>(output.stdout)
            })
            .await?;
        Ok(output.as_str())
    }

    /// Every rendered document, indexed by kind and name
    pub async fn resources(&self) -> Result<&ResourceIndex> {
        self.index
            .get_or_try_init(|| async {
                let output = self.evaluate().await?;
                let locator = SectionLocator::new(self.release.completion_line());
                let index = ResourceIndex::from_dry_run(output, &locator)?;
                debug!(
                    release = self.release.name(),
                    documents = index.len(),
                    "Indexed dry-run output"
                );
                Ok::<_, KubeError>(index)
            })
            .await
    }

    /// Every Job, keyed by name
    pub async fn jobs(&self) -> Result<BTreeMap<String, Job>> {
        Ok(self.resources().await?.jobs())
    }

    /// Jobs annotated as helm hooks, keyed by name
    pub async fn hooks(&self) -> Result<BTreeMap<String, Job>> {
        Ok(self.resources().await?.hooks())
    }

    /// Hook Jobs in execution order: ascending weight, then name
    pub async fn hooks_in_order(&self) -> Result<Vec<Job>> {
        Ok(self.resources().await?.hooks_in_order())
    }

    /// Every Deployment, keyed by name
    pub async fn deployments(&self) -> Result<BTreeMap<String, Deployment>> {
        Ok(self.resources().await?.deployments())
    }

    // ========== Deploy ==========

    /// Create the release namespace unless it already exists
    ///
    /// Returns whether a namespace was created.
    pub async fn ensure_namespace(&self) -> Result<bool> {
        let namespace = self.release.namespace();
        if self.namespaces.namespace_exists(namespace).await? {
            debug!(namespace, "Namespace exists");
            return Ok(false);
        }

        self.namespaces.create_namespace(namespace).await?;
        info!(namespace, "Created namespace");
        Ok(true)
    }

    /// Install or upgrade the release
    ///
    /// The namespace is ensured first on every call. In dry-run mode helm
    /// renders and validates without touching the cluster.
    pub async fn deploy(&self) -> Result<()> {
        self.ensure_namespace().await?;

        let invocation = self.command().deploy();
        info!(
            release = self.release.name(),
            namespace = self.release.namespace(),
            dry_run = self.settings.dry_run,
            "Deploying release"
        );
        self.runner.run(&invocation, true).await?;
        Ok(())
    }

    // ========== Dismiss ==========

    /// Purge the release, optionally removing its namespace afterwards
    ///
    /// The namespace is left alone when the purge fails or in dry-run mode.
    pub async fn dismiss(&self, with_namespace: bool) -> Result<()> {
        info!(release = self.release.name(), "Dismissing release");
        self.runner.run(&self.command().delete(), true).await?;

        if !with_namespace || self.settings.dry_run {
            return Ok(());
        }

        let namespace = self.release.namespace();
        if self.namespaces.namespace_exists(namespace).await? {
            self.namespaces.delete_namespace(namespace).await?;
            info!(namespace, "Deleted namespace");
        }
        Ok(())
    }
}
