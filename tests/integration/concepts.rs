use ocl_dict::api::{ConceptRef, ResourceApi, concept_url};
use ocl_dict::core::OclError;
use ocl_dict::orchestrator::DictionaryOrchestrator;
use ocl_dict::resolver::{DependentConceptResolver, ResolverOptions};
use ocl_dict::store::{ActionType, AppState};
use ocl_dict::test_utils::{ApiCall, Endpoint, MockApi, internal_mapping};
use std::sync::Arc;

const CIEL: &str = "/orgs/CIEL/sources/CIEL/";
const COLLECTION: &str = "/users/admin/collections/MC/";

fn orchestrator(api: &Arc<MockApi>) -> DictionaryOrchestrator {
    let api: Arc<dyn ResourceApi> = api.clone();
    DictionaryOrchestrator::new(api, AppState::shared(), ResolverOptions::new(CIEL))
}

fn concepts(ids: &[&str]) -> Vec<ConceptRef> {
    ids.iter().map(|id| ConceptRef::from_id(CIEL, id)).collect()
}

/// A question (1) with two answers (2, 3); answer 3 is itself a set containing 4,
/// which maps back to the question.
fn clinic_api() -> MockApi {
    MockApi::new()
        .with_mapping(internal_mapping(CIEL, "1", "2", "Q-AND-A"))
        .with_mapping(internal_mapping(CIEL, "1", "3", "Q-AND-A"))
        .with_mapping(internal_mapping(CIEL, "3", "4", "CONCEPT-SET"))
        .with_mapping(internal_mapping(CIEL, "4", "1", "SAME-AS"))
}

#[tokio::test]
async fn test_transitive_dependents_are_added_before_the_concept() {
    let api = Arc::new(clinic_api());
    let orchestrator = orchestrator(&api);

    assert!(orchestrator.add_concepts_to_collection(COLLECTION, &concepts(&["1"]), false).await);

    let added: Vec<ApiCall> =
        api.calls().into_iter().filter(|c| c.endpoint() == Endpoint::AddReferences).collect();
    assert_eq!(
        added,
        vec![ApiCall::AddReferences {
            collection_url: COLLECTION.to_string(),
            expressions: vec![
                concept_url(CIEL, "2"),
                concept_url(CIEL, "3"),
                concept_url(CIEL, "4"),
                concept_url(CIEL, "1"),
            ],
        }]
    );
    // Each concept's mappings are fetched once despite the cycle back to 1
    assert_eq!(api.mapping_fetches().len(), 4);
    assert_eq!(orchestrator.state().added_references(COLLECTION).len(), 4);
}

#[tokio::test]
async fn test_resolver_alone_reports_references_and_progress() {
    let api = clinic_api();
    let resolver = DependentConceptResolver::new(&api, ResolverOptions::new(CIEL));

    let mut messages = Vec::new();
    let resolved = resolver.resolve_references(["1"], |m| messages.push(m.to_string())).await;

    assert!(resolved.is_complete());
    assert_eq!(
        resolved.references,
        vec![concept_url(CIEL, "2"), concept_url(CIEL, "3"), concept_url(CIEL, "4")]
    );
    assert!(!messages.is_empty());
}

#[tokio::test]
async fn test_concurrent_additions_keep_separate_logs() {
    let api = Arc::new(clinic_api());
    let orchestrator = orchestrator(&api);
    let first = concepts(&["1"]);
    let second = concepts(&["5", "6"]);

    let (a, b) = tokio::join!(
        orchestrator.add_concepts_to_collection(COLLECTION, &first, false),
        orchestrator.add_concepts_to_collection(COLLECTION, &second, false)
    );
    assert!(a && b);

    let runs = orchestrator.state().statuses_for(ActionType::AddConceptsToCollection);
    assert_eq!(runs.len(), 2);
    let lasts: Vec<String> = runs
        .iter()
        .map(|(_, status)| status.last_progress().unwrap_or_default().to_string())
        .collect();
    assert!(lasts.iter().any(|m| m == "Adding concept: 1--Added concept"));
    assert!(lasts.iter().any(|m| m == "Adding concepts (2): 5, 6--Added concepts (2)"));
    for (_, status) in &runs {
        assert!(status.succeeded());
        let single = status.progress.iter().all(|m| m.starts_with("Adding concept: 1--"));
        let pair = status.progress.iter().all(|m| m.starts_with("Adding concepts (2): 5, 6--"));
        assert!(single || pair, "interleaved log: {:?}", status.progress);
    }
}

#[tokio::test]
async fn test_unreachable_mappings_still_add_the_concept() {
    let api = Arc::new(clinic_api().fail_url(
        &concept_url(CIEL, "3"),
        OclError::Network {
            url: concept_url(CIEL, "3"),
            reason: "timed out".to_string(),
        },
    ));
    let orchestrator = orchestrator(&api);

    assert!(orchestrator.add_concepts_to_collection(COLLECTION, &concepts(&["1"]), true).await);

    let added = orchestrator.state().added_references(COLLECTION);
    let expressions: Vec<&str> = added.iter().map(|r| r.expression.as_str()).collect();
    assert_eq!(expressions, vec![concept_url(CIEL, "2"), concept_url(CIEL, "3"), concept_url(CIEL, "1")]);
}
