//! Resources command - show what a release renders

use helmsman_core::DeploySettings;
use tracing::debug;

use super::{ReleaseArgs, release_client};
use crate::display::{self, OutputFormat, ResourceFilter};
use crate::error::Result;

/// Run the resources command
pub async fn run(
    args: &ReleaseArgs,
    settings: DeploySettings,
    filter: ResourceFilter,
    format: OutputFormat,
) -> Result<()> {
    let client = release_client(args, settings)?;
    let index = client.resources().await?;
    debug!(documents = index.len(), ?filter, "Selecting resources");

    let selected = display::select(index, filter);
    print!("{}", display::render(&selected, format)?);
    Ok(())
}
