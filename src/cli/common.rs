//! Shared plumbing for commands that talk to the server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::future::Future;
use std::sync::Arc;

use super::CliConfig;
use crate::api::{HttpApi, ResourceApi};
use crate::config::GlobalConfig;
use crate::orchestrator::DictionaryOrchestrator;
use crate::resolver::ResolverOptions;
use crate::store::{ActionStatus, ActionType, AppState};
use crate::utils::progress::{ProgressBar, ProgressReporter};

/// Everything a command needs to run orchestrated operations.
pub struct Session {
    pub config: GlobalConfig,
    pub state: Arc<AppState>,
    pub orchestrator: DictionaryOrchestrator,
    no_progress: bool,
    quiet: bool,
}

impl Session {
    /// Load configuration (file, then environment, then flags) and connect over HTTP.
    pub async fn open(cli: &CliConfig) -> Result<Self> {
        let config = GlobalConfig::load_with_optional(cli.config_path.clone())
            .await
            .context("Failed to load global configuration")?
            .with_env_overrides()
            .with_overrides(cli.api_url.clone(), cli.token.clone());

        let api = HttpApi::from_config(&config)
            .with_context(|| format!("Failed to set up a client for {}", config.api_url))?;
        Ok(Self::with_api(cli, config, Arc::new(api)))
    }

    /// Session over any [`ResourceApi`].
    #[must_use]
    pub fn with_api(cli: &CliConfig, config: GlobalConfig, api: Arc<dyn ResourceApi>) -> Self {
        let state = AppState::shared();
        let orchestrator = DictionaryOrchestrator::new(
            api,
            Arc::clone(&state),
            ResolverOptions::from_config(&config),
        );
        Self {
            config,
            state,
            orchestrator,
            no_progress: cli.no_progress || cli.quiet,
            quiet: cli.quiet,
        }
    }

    #[must_use]
    pub const fn quiet(&self) -> bool {
        self.quiet
    }

    /// Await `operation` while a spinner mirrors the store's progress.
    pub async fn with_progress<F: Future>(&self, operation: F) -> F::Output {
        let reporter = ProgressReporter::spawn(&self.state, ProgressBar::new_spinner(self.no_progress));
        let output = operation.await;
        reporter.finish().await;
        output
    }

    /// Latest run of `action`.
    #[must_use]
    pub fn last_run(&self, action: ActionType) -> Option<ActionStatus> {
        self.state.statuses_for(action).pop().map(|(_, status)| status)
    }

    /// Turn an unsuccessful run of `action` into an error carrying the recorded failure.
    pub fn ensure_succeeded(&self, action: ActionType, succeeded: bool) -> Result<()> {
        if succeeded {
            return Ok(());
        }
        let failure = self.last_run(action).and_then(|status| status.failure);
        match failure {
            Some(failure) => Err(failure.to_error().into()),
            None => Err(anyhow::anyhow!("{action} did not complete")),
        }
    }

    /// Print a success line unless `--quiet`.
    pub fn success(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", "✓".green(), message.as_ref());
        }
    }
}

/// `/users/<user>/` or `/orgs/<org>/` from the command-line owner flags.
pub fn owner_url(user: Option<&str>, org: Option<&str>) -> Result<String> {
    match (user, org) {
        (Some(user), None) => Ok(format!("/users/{}/", user.trim_matches('/'))),
        (None, Some(org)) => Ok(format!("/orgs/{}/", org.trim_matches('/'))),
        (Some(_), Some(_)) => Err(anyhow::anyhow!("Pass either --user or --org, not both")),
        (None, None) => Err(anyhow::anyhow!("An owner is required: pass --user or --org")),
    }
}
