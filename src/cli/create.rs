//! `ocl-dict create`: create a dictionary with its private source and collection.
//!
//! ```bash
//! ocl-dict create --user admin --name "Malaria Clinic" --short-code MC \
//!     --default-locale en --locales en,fr --visibility view
//! ```

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use super::common::{Session, owner_url};
use crate::api::{Dictionary, Visibility};
use crate::store::ActionType;

#[derive(Args, Debug)]
pub struct CreateCommand {
    /// Owning user
    #[arg(long, conflicts_with = "org")]
    user: Option<String>,

    /// Owning organisation
    #[arg(long)]
    org: Option<String>,

    /// Display name
    #[arg(long)]
    name: String,

    /// Short code, used as the dictionary id
    #[arg(long)]
    short_code: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Preferred language
    #[arg(long, default_value = "en")]
    default_locale: String,

    /// Other supported languages, comma-separated
    #[arg(long, value_delimiter = ',')]
    locales: Vec<String>,

    /// Source concepts are preferably added from
    #[arg(long, default_value = "CIEL")]
    preferred_source: String,

    /// none, view or edit
    #[arg(long, default_value = "none")]
    visibility: Visibility,
}

impl CreateCommand {
    fn dictionary(&self) -> Result<Dictionary> {
        let mut supported_locales = vec![self.default_locale.clone()];
        for locale in &self.locales {
            let locale = locale.trim();
            if !locale.is_empty() && !supported_locales.iter().any(|l| l == locale) {
                supported_locales.push(locale.to_string());
            }
        }

        Ok(Dictionary {
            name: self.name.clone(),
            short_code: self.short_code.clone(),
            description: self.description.clone(),
            default_locale: self.default_locale.clone(),
            supported_locales,
            owner_url: owner_url(self.user.as_deref(), self.org.as_deref())?,
            preferred_source: self.preferred_source.clone(),
            public_access: self.visibility,
        })
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let data = self.dictionary()?;
        let succeeded = session
            .with_progress(session.orchestrator.create_dictionary(&data.owner_url, &data))
            .await;
        session.ensure_succeeded(ActionType::CreateSourceCollectionDictionary, succeeded)?;

        let url = format!("{}collections/{}/", data.owner_url, data.short_code);
        session.success(format!("Created dictionary {} at {}", data.name, url));
        Ok(())
    }
}
