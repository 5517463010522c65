//! Dismiss command - purge a release from the cluster

use console::style;
use helmsman_core::DeploySettings;

use super::{ReleaseArgs, release_client};
use crate::error::Result;

/// Run the dismiss command
pub async fn run(args: &ReleaseArgs, settings: DeploySettings, with_namespace: bool) -> Result<()> {
    let dry_run = settings.dry_run;
    let client = release_client(args, settings)?;
    let release = client.release();

    println!(
        "{} Dismissing release {} from namespace {}",
        style("→").blue().bold(),
        style(release.name()).cyan(),
        style(release.namespace()).yellow()
    );

    client.dismiss(with_namespace).await?;

    if dry_run {
        println!(
            "{} Dry run - would dismiss {}",
            style("✓").green().bold(),
            style(release.name()).cyan()
        );
        return Ok(());
    }

    println!(
        "{} Release {} dismissed",
        style("✓").green().bold(),
        style(release.name()).cyan()
    );
    if with_namespace {
        println!(
            "{} Namespace {} removed",
            style("✓").green().bold(),
            style(release.namespace()).yellow()
        );
    }
    Ok(())
}
