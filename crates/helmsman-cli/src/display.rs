//! Display formatting for CLI output
//!
//! Resources are shown as an aligned table, as raw YAML documents, or as a
//! JSON summary.

use clap::ValueEnum;
use console::style;
use helmsman_core::{Deployment, Job, Resource, ResourceIndex, ResourceSpec};
use serde::Serialize;
use std::fmt::Write;

use crate::error::{CliError, Result};

/// Which resources the `resources` command shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceFilter {
    /// Every rendered document
    All,
    /// Every Job, hook or not
    Jobs,
    /// Hook Jobs in execution order
    Hooks,
    /// Deployments
    Deployments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Yaml,
    Json,
}

/// Hook annotations of a Job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookSummary {
    pub phases: Vec<String>,
    pub weight: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete_policies: Vec<String>,
}

/// One row of resource output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ResourceSummary {
    fn base(resource: &impl ResourceSpec) -> Self {
        Self {
            kind: resource.kind().to_string(),
            name: resource.name().to_string(),
            namespace: resource.namespace().map(str::to_string),
            hook: None,
            replicas: None,
            images: resource.images(),
        }
    }

    pub fn from_job(job: &Job) -> Self {
        let hook = job.is_hook().then(|| HookSummary {
            phases: job.hook_phases().iter().map(ToString::to_string).collect(),
            weight: job.hook_weight(),
            delete_policies: job.hook_delete_policies(),
        });
        Self {
            hook,
            ..Self::base(job)
        }
    }

    pub fn from_deployment(deployment: &Deployment) -> Self {
        Self {
            replicas: Some(deployment.replicas()),
            ..Self::base(deployment)
        }
    }

    pub fn from_resource(resource: &Resource) -> Self {
        match resource {
            Resource::Job(job) => Self::from_job(job),
            Resource::Deployment(deployment) => Self::from_deployment(deployment),
            Resource::Generic(_) => Self::base(resource),
        }
    }

    /// Short description for the DETAILS column
    fn details(&self) -> String {
        if let Some(hook) = &self.hook {
            return format!("hook {} (weight {})", hook.phases.join(","), hook.weight);
        }
        if let Some(replicas) = self.replicas {
            return format!("{} replica(s)", replicas);
        }
        String::new()
    }
}

/// Resources selected by `filter`
pub fn select(index: &ResourceIndex, filter: ResourceFilter) -> Vec<Resource> {
    match filter {
        ResourceFilter::All => index.resources(),
        ResourceFilter::Jobs => index.jobs().into_values().map(Resource::Job).collect(),
        ResourceFilter::Hooks => index
            .hooks_in_order()
            .into_iter()
            .map(Resource::Job)
            .collect(),
        ResourceFilter::Deployments => index
            .deployments()
            .into_values()
            .map(Resource::Deployment)
            .collect(),
    }
}

/// Render resources in the requested format
pub fn render(resources: &[Resource], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let summaries: Vec<ResourceSummary> =
                resources.iter().map(ResourceSummary::from_resource).collect();
            Ok(render_table(&summaries))
        }
        OutputFormat::Yaml => render_yaml(resources),
        OutputFormat::Json => {
            let summaries: Vec<ResourceSummary> =
                resources.iter().map(ResourceSummary::from_resource).collect();
            serde_json::to_string_pretty(&summaries)
                .map(|json| json + "\n")
                .map_err(|e| CliError::Other {
                    message: format!("Failed to serialize resources: {}", e),
                })
        }
    }
}

fn render_table(summaries: &[ResourceSummary]) -> String {
    if summaries.is_empty() {
        return "No resources found\n".to_string();
    }

    let kind_width = column_width(summaries.iter().map(|s| s.kind.as_str()), "KIND");
    let name_width = column_width(summaries.iter().map(|s| s.name.as_str()), "NAME");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<kw$}  {:<nw$}  {}",
        style("KIND").bold(),
        style("NAME").bold(),
        style("DETAILS").bold(),
        kw = kind_width,
        nw = name_width,
    );
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<kw$}  {:<nw$}  {}",
            style(&summary.kind).cyan(),
            summary.name,
            style(summary.details()).dim(),
            kw = kind_width,
            nw = name_width,
        );
    }
    out
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

fn render_yaml(resources: &[Resource]) -> Result<String> {
    let mut out = String::new();
    for resource in resources {
        let yaml = serde_yaml::to_string(resource).map_err(|e| CliError::Other {
            message: format!("Failed to serialize {}: {}", resource.name(), e),
        })?;
        out.push_str("---\n");
        out.push_str(&yaml);
    }
    Ok(out)
}
