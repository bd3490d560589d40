//! Manage the global ocl-dict configuration.
//!
//! The configuration file (`~/.ocl/config.toml`, or the path given by `--config` or
//! `OCL_CONFIG`) holds the server URL, the API token and the settings used when
//! resolving dependent concepts. It contains a secret, so it is written with
//! owner-only permissions and never printed without masking the token.
//!
//! # Examples
//!
//! ```bash
//! ocl-dict config init
//! ocl-dict config show
//! ocl-dict config          # defaults to show
//! ocl-dict config path
//! ```
//!
//! # File Structure
//!
//! ```toml
//! api_url = "https://api.openconceptlab.org"
//! token = "YOUR_API_TOKEN"
//! concepts_source_url = "/orgs/CIEL/sources/CIEL/"
//! dependency_map_types = ["Q-AND-A", "CONCEPT-SET"]
//! include_retired_mappings = false
//! page_limit = 100
//! retry_attempts = 3
//! request_timeout_secs = 30
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::GlobalConfig;

/// Command to manage the global configuration.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Configuration subcommand (defaults to `show`)
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration in effect, with the token masked
    Show,

    /// Print the configuration file location
    Path,
}

impl ConfigCommand {
    /// Run the subcommand against `config_path`, or the default location when `None`.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = match config_path {
            Some(path) => path,
            None => GlobalConfig::resolve_path()?,
        };

        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
        }
    }

    async fn init(force: bool, config_path: PathBuf) -> Result<()> {
        if config_path.exists() && !force {
            println!("❌ Global config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = GlobalConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created global config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  1. Replace 'YOUR_API_TOKEN' with the token from your account settings");
        println!("  2. Point 'api_url' at your terminology server if it is not the public one");

        Ok(())
    }

    async fn show(config_path: PathBuf) -> Result<()> {
        let exists = config_path.exists();
        let config = GlobalConfig::load_with_optional(Some(config_path.clone()))
            .await?
            .with_env_overrides();

        println!("{}", "Global Configuration".bold());
        println!("Location: {}\n", config_path.display());
        println!("{}", toml::to_string_pretty(&config.redacted())?);

        if !exists {
            println!("\n{}", "Tip:".yellow());
            println!("  No file found; showing defaults. Run 'ocl-dict config init' to create one");
        }
        Ok(())
    }
}
