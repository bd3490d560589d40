//! ocl-dict CLI entry point
//!
//! Parses the command line, runs the selected command and renders failures with
//! context and suggestions.
//!
//! - `create` / `edit` - Manage a dictionary with its private source and collection
//! - `add-concepts` / `remove-references` - Manage the concepts in a dictionary
//! - `show` / `list` - Inspect dictionaries
//! - `config` - Manage global configuration

use anyhow::Result;
use clap::Parser;
use ocl_dict::cli;
use ocl_dict::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
