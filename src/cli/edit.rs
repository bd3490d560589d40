//! `ocl-dict edit`: update a dictionary and its backing source and collection.
//!
//! Unspecified fields keep their stored values.
//!
//! ```bash
//! ocl-dict edit /users/admin/dictionaries/MC/ --name "Malaria Clinic (v2)" --visibility edit
//! ```

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use super::common::Session;
use crate::api::{Dictionary, Visibility, dictionary_api_url};
use crate::orchestrator::LinkedResources;
use crate::store::ActionType;

#[derive(Args, Debug)]
pub struct EditCommand {
    /// Dictionary URL (`/dictionaries/` and `/collections/` paths are both accepted)
    dictionary: String,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    default_locale: Option<String>,

    /// Supported languages, comma-separated; replaces the stored list
    #[arg(long, value_delimiter = ',')]
    locales: Option<Vec<String>>,

    #[arg(long)]
    preferred_source: Option<String>,

    /// none, view or edit
    #[arg(long)]
    visibility: Option<Visibility>,
}

impl EditCommand {
    /// Stored values overridden by the flags that were given.
    fn apply(&self, mut data: Dictionary) -> Dictionary {
        if let Some(name) = &self.name {
            data.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            data.description.clone_from(description);
        }
        if let Some(locale) = &self.default_locale {
            data.default_locale.clone_from(locale);
        }
        if let Some(locales) = &self.locales {
            data.supported_locales =
                locales.iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
        }
        if let Some(source) = &self.preferred_source {
            data.preferred_source.clone_from(source);
        }
        if let Some(visibility) = self.visibility {
            data.public_access = visibility;
        }
        data
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let dictionary_url = dictionary_api_url(&self.dictionary);
        let orchestrator = &session.orchestrator;

        let stored = session
            .with_progress(orchestrator.retrieve_dictionary_and_details(&dictionary_url))
            .await;
        let Some(stored) = stored else {
            session.ensure_succeeded(ActionType::RetrieveDictionary, false)?;
            anyhow::bail!("Dictionary {dictionary_url} could not be loaded");
        };

        let linked = LinkedResources::from_dictionary(&stored)?;
        let data = self.apply(Dictionary::from_api(&stored));

        let succeeded = session
            .with_progress(orchestrator.edit_dictionary(&dictionary_url, &data, &linked))
            .await;
        session.ensure_succeeded(ActionType::EditSourceCollectionDictionary, succeeded)?;

        session.success(format!("Updated dictionary {} ({})", data.name, dictionary_url));
        Ok(())
    }
}
