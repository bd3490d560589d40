//! `ocl-dict show`: display a dictionary with its versions and linked resources.
//!
//! ```bash
//! ocl-dict show /users/admin/dictionaries/MC/
//! ocl-dict show /users/admin/dictionaries/MC/ --json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::CliConfig;
use super::common::Session;
use crate::api::{ApiCollection, ApiDictionary, ApiDictionaryVersion, ApiSource, dictionary_api_url};
use crate::store::ActionType;

#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Dictionary URL
    dictionary: String,

    /// Print JSON instead of a summary
    #[arg(long)]
    json: bool,
}

/// Everything loaded for one dictionary.
#[derive(Debug, Serialize)]
struct DictionaryDetails {
    dictionary: ApiDictionary,
    versions: Vec<ApiDictionaryVersion>,
    source: Option<ApiSource>,
    collection: Option<ApiCollection>,
}

impl DictionaryDetails {
    fn from_session(session: &Session, dictionary: ApiDictionary, dictionary_url: &str) -> Self {
        let extras = dictionary.extras.clone().unwrap_or_default();
        Self {
            versions: session.state.versions(dictionary_url),
            source: extras.source.as_deref().and_then(|url| session.state.source(url)),
            collection: extras.collection.as_deref().and_then(|url| session.state.collection(url)),
            dictionary,
        }
    }

    fn print(&self) {
        let d = &self.dictionary;
        println!("{} ({})", d.name.bold(), d.short_code.as_deref().unwrap_or(&d.id));
        println!("  URL: {}", d.url);
        if let Some(owner) = &d.owner_url {
            println!("  Owner: {owner}");
        }
        if let Some(description) = d.description.as_deref().filter(|s| !s.is_empty()) {
            println!("  Description: {description}");
        }
        println!(
            "  Languages: {} (supported: {})",
            d.default_locale.as_deref().unwrap_or("-"),
            if d.supported_locales.is_empty() { "-".to_string() } else { d.supported_locales.join(", ") }
        );
        if let Some(preferred) = &d.preferred_source {
            println!("  Preferred source: {preferred}");
        }
        println!("  Visibility: {}", d.public_access.unwrap_or_default());

        match (&self.source, d.extras.as_ref().and_then(|e| e.source.as_deref())) {
            (Some(source), _) => println!("  Linked source: {} ({})", source.url, source.name),
            (None, Some(url)) => println!("  Linked source: {url} {}", "(not loaded)".dimmed()),
            (None, None) => println!("  Linked source: {}", "none".dimmed()),
        }
        match (&self.collection, d.extras.as_ref().and_then(|e| e.collection.as_deref())) {
            (Some(collection), _) => {
                println!("  Linked collection: {} ({})", collection.url, collection.name);
            }
            (None, Some(url)) => println!("  Linked collection: {url} {}", "(not loaded)".dimmed()),
            (None, None) => println!("  Linked collection: {}", "none".dimmed()),
        }

        if self.versions.is_empty() {
            println!("\n  No versions");
            return;
        }
        println!("\n  {}", "Versions".bold());
        for version in &self.versions {
            let created = version
                .created_on
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string());
            let state = if version.released { "released".green() } else { "draft".yellow() };
            println!("    {:<16} {:<10} {}", version.id, state, created);
        }
    }
}

impl ShowCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let dictionary_url = dictionary_api_url(&self.dictionary);
        let Some(dictionary) = session
            .with_progress(session.orchestrator.retrieve_dictionary_and_details(&dictionary_url))
            .await
        else {
            session.ensure_succeeded(ActionType::RetrieveDictionary, false)?;
            anyhow::bail!("Dictionary {dictionary_url} could not be loaded");
        };

        let details = DictionaryDetails::from_session(session, dictionary, &dictionary_url);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&details)?);
        } else {
            details.print();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ResourceApi;
    use crate::config::GlobalConfig;
    use crate::core::OclError;
    use crate::test_utils::{MockApi, stored_dictionary};
    use std::sync::Arc;

    fn session(api: &Arc<MockApi>) -> Session {
        let cli = CliConfig {
            quiet: true,
            no_progress: true,
            ..CliConfig::default()
        };
        let api: Arc<dyn ResourceApi> = api.clone();
        Session::with_api(&cli, GlobalConfig::default(), api)
    }

    fn source(url: &str) -> ApiSource {
        ApiSource {
            id: "MCSource".to_string(),
            url: url.to_string(),
            short_code: Some("MCSource".to_string()),
            name: "Malaria Clinic Source".to_string(),
            source_type: None,
            public_access: None,
        }
    }

    #[tokio::test]
    async fn test_details_collect_loaded_resources() {
        let dictionary = stored_dictionary("MC");
        let source_url = "/users/admin/sources/MCSource/";
        let version = ApiDictionaryVersion {
            id: "v1".to_string(),
            url: format!("{}v1/", dictionary.url),
            released: true,
            description: None,
            created_on: None,
        };
        let api = Arc::new(
            MockApi::new()
                .with_dictionary(dictionary.clone())
                .with_source(source(source_url))
                .with_versions(&dictionary.url, vec![version.clone()]),
        );
        let session = session(&api);

        let loaded = session
            .orchestrator
            .retrieve_dictionary_and_details(&dictionary.url)
            .await
            .unwrap();
        let details = DictionaryDetails::from_session(&session, loaded, &dictionary.url);

        assert_eq!(details.versions, vec![version]);
        assert_eq!(details.source.map(|s| s.url).as_deref(), Some(source_url));
        // The linked collection was never stored in the mock
        assert!(details.collection.is_none());
    }

    #[tokio::test]
    async fn test_show_json() {
        let api = Arc::new(MockApi::new().with_dictionary(stored_dictionary("MC")));
        let cmd = ShowCommand {
            dictionary: "/users/admin/dictionaries/MC/".to_string(),
            json: true,
        };
        assert!(cmd.execute_with(&session(&api)).await.is_ok());
    }

    #[tokio::test]
    async fn test_show_missing_dictionary() {
        let api = Arc::new(MockApi::new());
        let cmd = ShowCommand {
            dictionary: "/users/admin/collections/NOPE/".to_string(),
            json: false,
        };
        let error = cmd.execute_with(&session(&api)).await.unwrap_err();
        assert_eq!(error.downcast_ref::<OclError>().and_then(OclError::status), Some(404));
    }
}
