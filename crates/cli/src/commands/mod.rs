use clap::Subcommand;
use eyre::Result;
use packbridge_config::Settings;

pub mod build;
pub mod populate;
pub mod status;

#[derive(Subcommand)]
pub enum Commands {
    /// Build one bundle and print its tags
    Build {
        /// Bundle identifier, relative to CONFIG_DIRS or absolute
        bundle: String,

        /// Context values passed to the config file (key=value, value parsed as JSON when possible)
        #[arg(short = 'c', long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Print the assets as JSON instead of rendered tags
        #[arg(long)]
        json: bool,
    },

    /// Build bundles and merge them into the cache file
    PopulateCache {
        /// Bundle identifiers (defaults to the CACHE setting)
        bundles: Vec<String>,
    },

    /// Build every bundle and context listed in MANIFEST and write the manifest
    PopulateManifest,

    /// Check whether the build service is answering
    Status,
}

impl Commands {
    pub async fn execute(self, settings: Settings) -> Result<()> {
        match self {
            Commands::Build {
                bundle,
                context,
                json,
            } => build::execute(settings, &bundle, &context, json).await,
            Commands::PopulateCache { bundles } => populate::cache(settings, bundles).await,
            Commands::PopulateManifest => populate::manifest(settings).await,
            Commands::Status => status::execute(settings).await,
        }
    }
}
