//! `ocl-dict add-concepts`: add concepts and everything they depend on to a collection.
//!
//! Identifiers are read from the command line and, with `--file`, from a file where
//! they may be separated by commas, spaces or newlines.
//!
//! ```bash
//! ocl-dict add-concepts /users/admin/dictionaries/MC/ 1234 5678
//! ocl-dict add-concepts /users/admin/dictionaries/MC/ --file ids.txt --bulk
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::CliConfig;
use super::common::Session;
use crate::api::{ConceptRef, dictionary_api_url};
use crate::core::OclError;
use crate::resolver::parse_concept_ids;
use crate::store::ActionType;

#[derive(Args, Debug)]
pub struct AddConceptsCommand {
    /// Collection or dictionary URL
    collection: String,

    /// Concept identifiers in the configured concepts source
    ids: Vec<String>,

    /// Read more identifiers from a file
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Count the concepts in progress messages instead of naming them
    #[arg(long)]
    bulk: bool,
}

impl AddConceptsCommand {
    async fn concept_ids(&self) -> Result<Vec<String>> {
        let mut raw = self.ids.join(",");
        if let Some(path) = &self.file {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read concept ids from {}", path.display()))?;
            raw.push(',');
            raw.push_str(&content);
        }
        Ok(parse_concept_ids(&raw))
    }

    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        // Checked before connecting so a missing id never reaches the server
        if self.concept_ids().await?.is_empty() {
            return Err(OclError::NoConceptIds.into());
        }
        let session = Session::open(cli).await?;
        self.execute_with(&session).await
    }

    pub(crate) async fn execute_with(self, session: &Session) -> Result<()> {
        let ids = self.concept_ids().await?;
        if ids.is_empty() {
            return Err(OclError::NoConceptIds.into());
        }

        let collection_url = dictionary_api_url(&self.collection);
        let source_url = &session.config.concepts_source_url;
        let concepts: Vec<ConceptRef> =
            ids.iter().map(|id| ConceptRef::from_id(source_url, id)).collect();

        let succeeded = session
            .with_progress(session.orchestrator.add_concepts_to_collection(
                &collection_url,
                &concepts,
                self.bulk,
            ))
            .await;
        session.ensure_succeeded(ActionType::AddConceptsToCollection, succeeded)?;

        let results = session.state.added_references(&collection_url);
        let added = results.iter().filter(|r| r.added).count();
        session.success(format!(
            "Added {added} reference(s) to {collection_url} for {} concept(s)",
            concepts.len()
        ));

        if !session.quiet() {
            for result in results.iter().filter(|r| !r.added) {
                println!("  {} {} {}", "!".yellow(), result.expression, result.message);
            }
        }
        Ok(())
    }
}
