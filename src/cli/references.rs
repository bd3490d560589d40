//! `ocl-dict remove-references`: remove concept references from a collection.

use anyhow::Result;
use clap::Args;

use super::CliConfig;
use super::common::Session;
use crate::api::dictionary_api_url;
use crate::store::ActionType;

#[derive(Args, Debug)]
pub struct RemoveReferencesCommand {
    /// Collection or dictionary URL
    collection: String,

    /// Reference expressions, as listed in the collection
    #[arg(required = true)]
    expressions: Vec<String>,
}

impl RemoveReferencesCommand {
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let collection_url = dictionary_api_url(&self.collection);
        let succeeded = session
            .with_progress(session.orchestrator.remove_references(&collection_url, &self.expressions))
            .await;
        session.ensure_succeeded(ActionType::RemoveReferencesFromCollection, succeeded)?;

        session.success(format!(
            "Removed {} reference(s) from {collection_url}",
            self.expressions.len()
        ));
        Ok(())
    }
}
