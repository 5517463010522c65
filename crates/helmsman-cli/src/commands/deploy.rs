//! Deploy command - install or upgrade a release

use console::style;
use helmsman_core::{DeploySettings, ResourceSpec};

use super::{ReleaseArgs, release_client};
use crate::error::Result;

/// Run the deploy command
pub async fn run(args: &ReleaseArgs, settings: DeploySettings) -> Result<()> {
    let dry_run = settings.dry_run;
    let client = release_client(args, settings)?;
    let release = client.release();

    println!(
        "{} Deploying release {} to namespace {}",
        style("→").blue().bold(),
        style(release.name()).cyan(),
        style(release.namespace()).yellow()
    );

    if client.ensure_namespace().await? {
        println!(
            "{} Created namespace {}",
            style("✓").green(),
            style(release.namespace()).yellow()
        );
    }

    // Evaluating first surfaces chart and manifest errors before anything is applied
    let hooks = client.hooks_in_order().await?;
    let deployments = client.deployments().await?;

    for hook in &hooks {
        let phases: Vec<String> = hook.hook_phases().iter().map(ToString::to_string).collect();
        println!(
            "  {} hook {} ({})",
            style("•").dim(),
            style(hook.name()).cyan(),
            phases.join(",")
        );
    }
    for deployment in deployments.values() {
        println!(
            "  {} deployment {} ({} replica(s))",
            style("•").dim(),
            style(deployment.name()).cyan(),
            deployment.replicas()
        );
    }

    client.deploy().await?;

    if dry_run {
        println!(
            "{} Dry run - release {} validated, nothing applied",
            style("✓").green().bold(),
            style(release.name()).cyan()
        );
    } else {
        println!(
            "{} Release {} deployed",
            style("✓").green().bold(),
            style(release.name()).cyan()
        );
    }

    Ok(())
}
