//! CLI commands

use clap::Args;
use helmsman_core::{DeploySettings, Release, ReleaseBuilder};
use helmsman_kube::{HostRunner, KubeNamespaces, ReleaseClient};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

pub mod deploy;
pub mod dismiss;
pub mod resources;

/// Release description shared by every command
///
/// Flags override the release file; `--values` and `--set` are appended after
/// the file's own entries.
#[derive(Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    /// Release file (YAML)
    #[arg(short, long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Release name
    pub name: Option<String>,

    /// Chart directory or reference
    pub chart: Option<PathBuf>,

    /// Image repository, passed as global.dapp.repo
    #[arg(long)]
    pub repo: Option<String>,

    /// Image tag, passed as global.dapp.image_version
    #[arg(long)]
    pub image_version: Option<String>,

    /// Target namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Values file(s), in order
    #[arg(short = 'f', long = "values")]
    pub values: Vec<PathBuf>,

    /// Set values on command line (key=value)
    #[arg(long = "set")]
    pub set: Vec<String>,

    /// Deploy timeout (e.g. 300s, 5m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

impl ReleaseArgs {
    /// Merge the release file with the command line
    pub fn to_release(&self) -> Result<Release> {
        let mut builder = match &self.config {
            Some(path) => ReleaseBuilder::from_file(path)?,
            None => Release::builder(),
        };

        if let Some(name) = &self.name {
            builder = builder.name(name);
        }
        if let Some(chart) = &self.chart {
            builder = builder.chart_path(chart);
        }
        if let Some(repo) = &self.repo {
            builder = builder.repo(repo);
        }
        if let Some(image_version) = &self.image_version {
            builder = builder.image_version(image_version);
        }
        if let Some(namespace) = &self.namespace {
            builder = builder.namespace(namespace);
        }
        for path in &self.values {
            builder = builder.values_file(path);
        }
        for option in &self.set {
            builder = builder.set(option);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.deploy_timeout(timeout);
        }

        Ok(builder.build()?)
    }
}

/// Client running the real helm binary against the current kube context
pub fn release_client(
    args: &ReleaseArgs,
    settings: DeploySettings,
) -> Result<ReleaseClient<HostRunner, KubeNamespaces>> {
    let release = args.to_release()?;
    Ok(ReleaseClient::new(
        release,
        settings,
        HostRunner,
        KubeNamespaces::new(),
    ))
}
