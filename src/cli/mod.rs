//! Command-line interface for ocl-dict
//!
//! # Available Commands
//!
//! ## Dictionaries
//! - `create` - Create a dictionary with its private source and collection
//! - `edit` - Update a dictionary and its linked source and collection
//! - `show` - Show a dictionary, its versions and linked resources
//! - `list` - List personal and organisation dictionaries
//!
//! ## Concepts
//! - `add-concepts` - Add concepts and every concept they depend on to a collection
//! - `remove-references` - Remove references from a collection
//!
//! ## System
//! - `config` - Manage the global configuration file
//!
//! # Global Options
//!
//! ```bash
//! ocl-dict --verbose create --user admin --name "Malaria Clinic" --short-code MC
//! ocl-dict --quiet --no-progress add-concepts /users/admin/collections/MC/ 1234 5678
//! ocl-dict --config ./ocl.toml --api-url http://localhost:8000 list --user admin
//! ```
//!
//! `--api-url` and `--token` win over `OCL_API_URL`/`OCL_API_TOKEN`, which win over the
//! configuration file.

mod add_concepts;
mod common;
mod config;
mod create;
mod edit;
mod list;
mod references;
mod show;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use common::Session;

/// Settings derived from the global flags, passed to every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default filter directive; `None` keeps logging off unless `RUST_LOG` is set
    pub log_level: Option<String>,
    pub no_progress: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub token: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber. `RUST_LOG` wins over `log_level`.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if let Some(level) = &self.log_level {
            EnvFilter::new(level)
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI structure for ocl-dict.
#[derive(Parser)]
#[command(
    name = "ocl-dict",
    about = "Manage terminology dictionaries on an Open Concept Lab server",
    version,
    long_about = "ocl-dict creates and edits dictionaries (with their private source and \
                  collection) and adds concepts to them together with every concept they \
                  depend on."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging, including every request
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable the progress spinner
    #[arg(
        long,
        global = true,
        env = "OCL_NO_PROGRESS",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_progress: bool,

    /// Path to the global configuration file (default: ~/.ocl/config.toml)
    #[arg(long, global = true, env = "OCL_CONFIG")]
    config: Option<PathBuf>,

    /// Terminology server base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// API token
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a dictionary with its private source and collection
    Create(create::CreateCommand),

    /// Update a dictionary and its linked source and collection
    Edit(edit::EditCommand),

    /// Add concepts and their dependent concepts to a collection
    AddConcepts(add_concepts::AddConceptsCommand),

    /// Remove references from a collection
    RemoveReferences(references::RemoveReferencesCommand),

    /// Show a dictionary with its versions and linked resources
    Show(show::ShowCommand),

    /// List personal and organisation dictionaries
    List(list::ListCommand),

    /// Manage the global configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command line.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("ocl_dict=debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("ocl_dict=warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            quiet: self.quiet,
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Create(cmd) => cmd.execute(&config).await,
            Commands::Edit(cmd) => cmd.execute(&config).await,
            Commands::AddConcepts(cmd) => cmd.execute(&config).await,
            Commands::RemoveReferences(cmd) => cmd.execute(&config).await,
            Commands::Show(cmd) => cmd.execute(&config).await,
            Commands::List(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(config.config_path.clone()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_config_levels() {
        let cli = Cli::parse_from(["ocl-dict", "--verbose", "config", "path"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("ocl_dict=debug"));

        let cli = Cli::parse_from(["ocl-dict", "--quiet", "config", "path"]);
        let config = cli.build_config();
        assert_eq!(config.log_level, None);
        assert!(config.quiet);

        let cli = Cli::parse_from(["ocl-dict", "config", "path"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("ocl_dict=warn"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ocl-dict", "-v", "-q", "config", "path"]).is_err());
    }

    #[test]
    fn test_global_overrides_collected() {
        let cli = Cli::parse_from([
            "ocl-dict",
            "--api-url",
            "http://localhost:8000",
            "--token",
            "abc",
            "--config",
            "/tmp/ocl.toml",
            "config",
            "path",
        ]);
        let config = cli.build_config();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.config_path, Some(PathBuf::from("/tmp/ocl.toml")));
    }

    #[test]
    #[serial]
    fn test_no_progress_accepts_any_env_value() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            std::env::set_var("OCL_NO_PROGRESS", "1");
        }
        let parsed = Cli::try_parse_from(["ocl-dict", "config", "path"]);
        unsafe {
            std::env::remove_var("OCL_NO_PROGRESS");
        }
        assert!(parsed.unwrap().build_config().no_progress);
    }
}
