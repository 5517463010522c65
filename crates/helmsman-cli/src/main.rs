//! Helmsman CLI - deploy helm releases and inspect what they render

use clap::{Parser, Subcommand};
use helmsman_core::{DEFAULT_HELM_BINARY, DeploySettings};

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;

use commands::ReleaseArgs;
use display::{OutputFormat, ResourceFilter};

#[derive(Parser)]
#[command(name = "helmsman")]
#[command(author = "Helmsman Contributors")]
#[command(version)]
#[command(about = "Deploy helm releases with computed globals and inspect their rendered resources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Render and validate only, never change the cluster
    #[arg(long, global = true, env = "HELMSMAN_DRY_RUN")]
    dry_run: bool,

    /// Echo helm commands and their output
    #[arg(short, long, global = true, env = "HELMSMAN_VERBOSE")]
    verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// helm executable to invoke
    #[arg(long, global = true, env = "HELMSMAN_HELM_BIN", default_value = DEFAULT_HELM_BINARY)]
    helm_bin: String,
}

impl Cli {
    fn settings(&self) -> DeploySettings {
        DeploySettings {
            dry_run: self.dry_run,
            verbose: self.verbose,
            helm_binary: self.helm_bin.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Install or upgrade a release
    Deploy {
        #[command(flatten)]
        release: ReleaseArgs,
    },

    /// Show the resources a release renders, without deploying it
    Resources {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Which resources to show
        #[arg(short, long, value_enum, default_value_t = ResourceFilter::All)]
        kind: ResourceFilter,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Purge a release
    Dismiss {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Delete the release namespace afterwards
        #[arg(long)]
        with_namespace: bool,
    },
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.debug);

    let settings = cli.settings();
    let result = match cli.command {
        Commands::Deploy { release } => commands::deploy::run(&release, settings).await,
        Commands::Resources {
            release,
            kind,
            output,
        } => commands::resources::run(&release, settings, kind, output).await,
        Commands::Dismiss {
            release,
            with_namespace,
        } => commands::dismiss::run(&release, settings, with_namespace).await,
    };

    if let Err(error) = result {
        let exit_code = error.exit_code();
        eprintln!("{:?}", miette::Report::new(error));
        std::process::exit(exit_code);
    }
}
