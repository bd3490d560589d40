use ocl_dict::api::{Dictionary, ResourceApi, Visibility};
use ocl_dict::constants::CIEL_SOURCE_URL;
use ocl_dict::core::OclError;
use ocl_dict::orchestrator::{DictionaryOrchestrator, LinkedResources};
use ocl_dict::resolver::ResolverOptions;
use ocl_dict::store::{ActionKey, ActionType, AppState, StoreEvent};
use ocl_dict::test_utils::{Endpoint, MockApi, TEST_OWNER_URL, sample_dictionary};
use std::sync::Arc;

fn orchestrator(api: &Arc<MockApi>) -> DictionaryOrchestrator {
    let api: Arc<dyn ResourceApi> = api.clone();
    DictionaryOrchestrator::new(api, AppState::shared(), ResolverOptions::new(CIEL_SOURCE_URL))
}

#[tokio::test]
async fn test_create_then_edit_round_trip() {
    let api = Arc::new(MockApi::new());
    let orchestrator = orchestrator(&api);
    let data = sample_dictionary();

    assert!(orchestrator.create_dictionary(TEST_OWNER_URL, &data).await);
    let dictionary_url = format!("{TEST_OWNER_URL}collections/{}/", data.short_code);

    let stored = orchestrator
        .retrieve_dictionary_and_details(&dictionary_url)
        .await
        .expect("created dictionary can be retrieved");
    let linked = LinkedResources::from_dictionary(&stored).unwrap();
    assert_eq!(linked.source, format!("{TEST_OWNER_URL}sources/MCSource/"));
    assert_eq!(linked.collection, format!("{TEST_OWNER_URL}collections/MCCollection/"));

    let edited = Dictionary {
        name: "Malaria Clinic (v2)".to_string(),
        public_access: Visibility::Edit,
        ..Dictionary::from_api(&stored)
    };
    assert!(orchestrator.edit_dictionary(&dictionary_url, &edited, &linked).await);

    let reloaded = orchestrator.retrieve_dictionary_and_details(&dictionary_url).await.unwrap();
    assert_eq!(reloaded.name, "Malaria Clinic (v2)");
    assert_eq!(reloaded.public_access, Some(Visibility::Edit));
}

#[tokio::test]
async fn test_subscriber_sees_create_lifecycle_in_order() {
    let api = Arc::new(MockApi::new());
    let orchestrator = orchestrator(&api);
    let mut events = orchestrator.state().subscribe();

    assert!(orchestrator.create_dictionary(TEST_OWNER_URL, &sample_dictionary()).await);

    let key = ActionKey::new(ActionType::CreateSourceCollectionDictionary, 0);
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            StoreEvent::Started(key),
            StoreEvent::Progress(key, "Creating source...".to_string()),
            StoreEvent::Progress(key, "Creating collection...".to_string()),
            StoreEvent::Progress(key, "Creating dictionary...".to_string()),
            StoreEvent::Completed(key),
        ]
    );
}

#[tokio::test]
async fn test_failed_create_keeps_partial_resources() {
    let api = Arc::new(MockApi::new().fail(
        Endpoint::CreateDictionary,
        OclError::ApiStatus {
            status: 400,
            url: format!("{TEST_OWNER_URL}collections/"),
            payload: Some(serde_json::json!({"short_code": ["already exists"]})),
        },
    ));
    let orchestrator = orchestrator(&api);

    assert!(!orchestrator.create_dictionary(TEST_OWNER_URL, &sample_dictionary()).await);

    let status = orchestrator
        .state()
        .status(ActionKey::new(ActionType::CreateSourceCollectionDictionary, 0))
        .unwrap();
    assert!(!status.loading);
    let failure = status.failure.unwrap();
    assert_eq!(failure.status, Some(400));
    assert_eq!(failure.payload, Some(serde_json::json!({"short_code": ["already exists"]})));

    // The source and collection created before the failure are not rolled back
    assert_eq!(api.count(Endpoint::CreateSource), 1);
    assert_eq!(api.count(Endpoint::CreateCollection), 1);
    assert!(orchestrator.state().source(&format!("{TEST_OWNER_URL}sources/MCSource/")).is_some());
}

#[tokio::test]
async fn test_concurrent_creates_are_tracked_separately() {
    let api = Arc::new(MockApi::new());
    let orchestrator = orchestrator(&api);

    let first = sample_dictionary();
    let second = Dictionary {
        short_code: "TB".to_string(),
        name: "TB Clinic".to_string(),
        ..sample_dictionary()
    };

    let (a, b) = tokio::join!(
        orchestrator.create_dictionary(TEST_OWNER_URL, &first),
        orchestrator.create_dictionary(TEST_OWNER_URL, &second)
    );
    assert!(a && b);

    let runs = orchestrator.state().statuses_for(ActionType::CreateSourceCollectionDictionary);
    assert_eq!(runs.len(), 2);
    for (_, status) in runs {
        assert_eq!(
            status.progress,
            vec!["Creating source...", "Creating collection...", "Creating dictionary..."]
        );
    }
}
