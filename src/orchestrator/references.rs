//! Adding concepts (with their dependents) to a collection and removing references.

use tracing::{debug, info};

use super::DictionaryOrchestrator;
use crate::api::{ConceptRef, ReferenceResult};
use crate::core::{ApiResult, OclError};
use crate::resolver::DependentConceptResolver;
use crate::store::{ActionKey, ActionType};

/// How a batch of concepts is named in progress messages.
struct BatchLabel {
    /// "concept" or "concepts (N)"
    noun: String,
    /// "this" or "these"
    pronoun: &'static str,
    /// Names listed after the noun; empty for bulk additions
    names: String,
}

impl BatchLabel {
    fn new(concepts: &[ConceptRef], bulk: bool) -> Self {
        let (noun, pronoun) = if concepts.len() > 1 {
            (format!("concepts ({})", concepts.len()), "these")
        } else {
            ("concept".to_string(), "this")
        };
        let names = if bulk {
            String::new()
        } else {
            concepts.iter().map(|c| c.display_name.as_str()).collect::<Vec<_>>().join(", ")
        };
        Self {
            noun,
            pronoun,
            names,
        }
    }

    fn message(&self, detail: &str) -> String {
        if self.names.is_empty() {
            format!("Adding {}--{}", self.noun, detail)
        } else {
            format!("Adding {}: {}--{}", self.noun, self.names, detail)
        }
    }
}

impl DictionaryOrchestrator {
    /// Add `concepts` and every concept they depend on to `collection_url`.
    ///
    /// Each call gets its own progress log, so several additions can run at once.
    /// With `bulk`, progress messages count the concepts instead of naming them.
    pub async fn add_concepts_to_collection(
        &self,
        collection_url: &str,
        concepts: &[ConceptRef],
        bulk: bool,
    ) -> bool {
        let key = self.begin(ActionType::AddConceptsToCollection);
        let result = self.add_concepts_steps(key, collection_url, concepts, bulk).await;
        self.finish(key, result)
    }

    async fn add_concepts_steps(
        &self,
        key: ActionKey,
        collection_url: &str,
        concepts: &[ConceptRef],
        bulk: bool,
    ) -> ApiResult<Vec<ReferenceResult>> {
        if concepts.is_empty() {
            return Err(OclError::NoConceptIds);
        }
        let label = BatchLabel::new(concepts, bulk);

        let resolver = DependentConceptResolver::new(self.api.as_ref(), self.resolver_options.clone());
        let dependents = resolver
            .resolve_references(concepts.iter().map(|c| c.id.as_str()), |message| {
                self.state.progress(key, label.message(message));
            })
            .await;

        let detail = if dependents.is_empty() {
            format!("Adding {}...", label.noun)
        } else {
            format!("Adding {} and {} dependent concepts...", label.pronoun, dependents.len())
        };
        self.state.progress(key, label.message(&detail));

        let mut expressions = dependents.references;
        expressions.extend(concepts.iter().map(|c| c.url.clone()));
        debug!("Adding {} reference(s) to {}", expressions.len(), collection_url);

        let results = self.api.add_references(collection_url, &expressions).await?;
        let added = results.iter().filter(|r| r.added).count();
        info!("{} of {} reference(s) added to {}", added, results.len(), collection_url);
        self.state.record_references(collection_url, results.clone());

        self.state.progress(key, label.message(&format!("Added {}", label.noun)));
        Ok(results)
    }

    /// Remove `expressions` from `collection_url`.
    pub async fn remove_references(&self, collection_url: &str, expressions: &[String]) -> bool {
        let key = self.begin(ActionType::RemoveReferencesFromCollection);
        self.state.progress(key, format!("Removing {} reference(s)...", expressions.len()));

        let result = self.api.delete_references(collection_url, expressions).await;
        if result.is_ok() {
            self.state.forget_references(collection_url, expressions);
            self.state.progress(key, format!("Removed {} reference(s)", expressions.len()));
        }
        self.finish(key, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ResourceApi, concept_url};
    use crate::resolver::ResolverOptions;
    use crate::store::AppState;
    use crate::test_utils::{ApiCall, Endpoint, MockApi, internal_mapping};
    use std::sync::Arc;

    const SOURCE: &str = "/orgs/CIEL/sources/CIEL/";
    const COLLECTION: &str = "/users/admin/collections/MCCollection/";

    fn orchestrator(api: &Arc<MockApi>) -> DictionaryOrchestrator {
        let api: Arc<dyn ResourceApi> = api.clone();
        DictionaryOrchestrator::new(api, AppState::shared(), ResolverOptions::new(SOURCE))
    }

    fn concept(id: &str) -> ConceptRef {
        ConceptRef::from_id(SOURCE, id)
    }

    #[tokio::test]
    async fn test_adds_dependents_before_requested() {
        let api = Arc::new(
            MockApi::new()
                .with_mapping(internal_mapping(SOURCE, "1", "2", "Q-AND-A"))
                .with_mapping(internal_mapping(SOURCE, "2", "3", "Q-AND-A")),
        );
        let orchestrator = orchestrator(&api);

        assert!(orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1")], false).await);

        let calls = api.calls();
        let Some(ApiCall::AddReferences {
            collection_url,
            expressions,
        }) = calls.last()
        else {
            panic!("expected add references last");
        };
        assert_eq!(collection_url, COLLECTION);
        assert_eq!(
            expressions,
            &vec![concept_url(SOURCE, "2"), concept_url(SOURCE, "3"), concept_url(SOURCE, "1")]
        );
        assert_eq!(orchestrator.state().added_references(COLLECTION).len(), 3);
    }

    #[tokio::test]
    async fn test_progress_messages() {
        let api = Arc::new(MockApi::new().with_mapping(internal_mapping(SOURCE, "1", "2", "Q-AND-A")));
        let orchestrator = orchestrator(&api);
        orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1")], false).await;

        let key = ActionKey::new(ActionType::AddConceptsToCollection, 0);
        let log = orchestrator.state().progress_log(key);
        assert_eq!(log[0], "Adding concept: 1--Found 1 dependent concept(s) of 1, 1 so far");
        assert_eq!(log[2], "Adding concept: 1--Adding this and 1 dependent concepts...");
        assert_eq!(log.last().unwrap(), "Adding concept: 1--Added concept");
    }

    #[tokio::test]
    async fn test_plural_and_bulk_labels() {
        let api = Arc::new(MockApi::new());
        let orchestrator = orchestrator(&api);
        orchestrator
            .add_concepts_to_collection(COLLECTION, &[concept("1"), concept("2")], true)
            .await;

        let key = ActionKey::new(ActionType::AddConceptsToCollection, 0);
        let log = orchestrator.state().progress_log(key);
        assert_eq!(log.last().unwrap(), "Adding concepts (2)--Added concepts (2)");
        assert!(log.iter().any(|m| m == "Adding concepts (2)--Adding concepts (2)..."));
    }

    #[tokio::test]
    async fn test_each_call_gets_its_own_index() {
        let api = Arc::new(MockApi::new());
        let orchestrator = orchestrator(&api);

        let first = [concept("1")];
        let second = [concept("2")];
        let (a, b) = tokio::join!(
            orchestrator.add_concepts_to_collection(COLLECTION, &first, false),
            orchestrator.add_concepts_to_collection(COLLECTION, &second, false)
        );
        assert!(a && b);

        let runs = orchestrator.state().statuses_for(ActionType::AddConceptsToCollection);
        assert_eq!(runs.len(), 2);
        assert!(runs[0].1.progress.iter().all(|m| m.starts_with("Adding concept: 1--")));
        assert!(runs[1].1.progress.iter().all(|m| m.starts_with("Adding concept: 2--")));
    }

    #[tokio::test]
    async fn test_resolution_failure_still_adds() {
        let api = Arc::new(MockApi::new().fail_url(
            &concept_url(SOURCE, "1"),
            OclError::Network {
                url: concept_url(SOURCE, "1"),
                reason: "timed out".to_string(),
            },
        ));
        let orchestrator = orchestrator(&api);

        assert!(orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1")], false).await);
        assert_eq!(api.count(Endpoint::AddReferences), 1);
    }

    #[tokio::test]
    async fn test_add_failure_recorded_with_payload() {
        let api = Arc::new(MockApi::new().fail(
            Endpoint::AddReferences,
            OclError::ApiStatus {
                status: 403,
                url: COLLECTION.to_string(),
                payload: Some(serde_json::json!({"detail": "Forbidden"})),
            },
        ));
        let orchestrator = orchestrator(&api);

        assert!(!orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1")], false).await);

        let key = ActionKey::new(ActionType::AddConceptsToCollection, 0);
        let status = orchestrator.state().status(key).unwrap();
        assert!(status.completed);
        let failure = status.failure.unwrap();
        assert_eq!(failure.status, Some(403));
        assert_eq!(failure.payload, Some(serde_json::json!({"detail": "Forbidden"})));
        assert!(orchestrator.state().added_references(COLLECTION).is_empty());
    }

    #[tokio::test]
    async fn test_no_concepts_fails_without_calls() {
        let api = Arc::new(MockApi::new());
        let orchestrator = orchestrator(&api);

        assert!(!orchestrator.add_concepts_to_collection(COLLECTION, &[], false).await);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_references() {
        let api = Arc::new(MockApi::new());
        let orchestrator = orchestrator(&api);
        orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1"), concept("2")], false).await;

        let removed = vec![concept_url(SOURCE, "1")];
        assert!(orchestrator.remove_references(COLLECTION, &removed).await);

        assert_eq!(
            api.calls().last(),
            Some(&ApiCall::DeleteReferences {
                collection_url: COLLECTION.to_string(),
                expressions: removed,
            })
        );
        let remaining = orchestrator.state().added_references(COLLECTION);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].expression, concept_url(SOURCE, "2"));
    }

    #[tokio::test]
    async fn test_remove_failure_keeps_cache() {
        let api = Arc::new(MockApi::new().fail(
            Endpoint::DeleteReferences,
            OclError::Other {
                message: "nope".to_string(),
            },
        ));
        let orchestrator = orchestrator(&api);
        orchestrator.add_concepts_to_collection(COLLECTION, &[concept("1")], false).await;

        assert!(!orchestrator.remove_references(COLLECTION, &[concept_url(SOURCE, "1")]).await);
        assert_eq!(orchestrator.state().added_references(COLLECTION).len(), 1);
    }
}
