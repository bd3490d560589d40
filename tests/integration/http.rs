use ocl_dict::api::{ConceptRef, HttpApi, ResourceApi};
use ocl_dict::orchestrator::DictionaryOrchestrator;
use ocl_dict::resolver::ResolverOptions;
use ocl_dict::store::{ActionKey, ActionType, AppState};
use ocl_dict::test_utils::{TEST_OWNER_URL, sample_dictionary};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CIEL: &str = "/orgs/CIEL/sources/CIEL/";

fn orchestrator(server: &MockServer) -> DictionaryOrchestrator {
    let api = HttpApi::new(server.uri(), Some("secret".to_string()))
        .unwrap()
        .with_retry_attempts(0);
    let api: Arc<dyn ResourceApi> = Arc::new(api);
    DictionaryOrchestrator::new(api, AppState::shared(), ResolverOptions::new(CIEL))
}

#[tokio::test]
async fn test_create_dictionary_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/sources/"))
        .and(header("authorization", "Token secret"))
        .and(body_partial_json(json!({"id": "MCSource", "public_access": "None"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "MCSource",
            "url": "/users/admin/sources/MCSource/",
            "name": "Malaria Clinic Source"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/admin/collections/"))
        .and(body_partial_json(json!({"id": "MCCollection"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "MCCollection",
            "url": "/users/admin/collections/MCCollection/",
            "name": "Malaria Clinic Collection"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/admin/collections/"))
        .and(body_partial_json(json!({
            "id": "MC",
            "public_access": "View",
            "extras": {
                "source": "/users/admin/sources/MCSource/",
                "collection": "/users/admin/collections/MCCollection/"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "MC",
            "url": "/users/admin/collections/MC/",
            "name": "Malaria Clinic",
            "supported_locales": "en,fr",
            "extras": {
                "source": "/users/admin/sources/MCSource/",
                "collection": "/users/admin/collections/MCCollection/"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server);
    assert!(orchestrator.create_dictionary(TEST_OWNER_URL, &sample_dictionary()).await);

    let dictionary = orchestrator.state().dictionary("/users/admin/collections/MC/").unwrap();
    assert_eq!(dictionary.supported_locales, vec!["en", "fr"]);
}

#[tokio::test]
async fn test_server_rejection_is_recorded_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/sources/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"__all__": ["Source already exists"]})),
        )
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server);
    assert!(!orchestrator.create_dictionary(TEST_OWNER_URL, &sample_dictionary()).await);

    let failure = orchestrator
        .state()
        .failure(ActionKey::new(ActionType::CreateSourceCollectionDictionary, 0))
        .unwrap();
    assert_eq!(failure.status, Some(400));
    assert_eq!(failure.payload, Some(json!({"__all__": ["Source already exists"]})));
    // Nothing after the failed step was attempted
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_add_concepts_with_dependents_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/CIEL/sources/CIEL/concepts/1000/mappings/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "map_type": "Q-AND-A",
                "from_concept_url": "/orgs/CIEL/sources/CIEL/concepts/1000/",
                "to_concept_url": "/orgs/CIEL/sources/CIEL/concepts/1001/",
                "to_concept_code": "1001",
                "to_source_url": "/orgs/CIEL/sources/CIEL/"
            },
            {
                "map_type": "SAME-AS",
                "from_concept_url": "/orgs/CIEL/sources/CIEL/concepts/1000/",
                "to_concept_url": "/orgs/SNOMED/sources/SNOMED-CT/concepts/42/",
                "to_concept_code": "42",
                "to_source_url": "/orgs/SNOMED/sources/SNOMED-CT/"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/CIEL/sources/CIEL/concepts/1001/mappings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/admin/collections/MC/references/"))
        .and(body_partial_json(json!({
            "data": {
                "expressions": [
                    "/orgs/CIEL/sources/CIEL/concepts/1001/",
                    "/orgs/CIEL/sources/CIEL/concepts/1000/"
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"added": true, "expression": "/orgs/CIEL/sources/CIEL/concepts/1001/", "message": "Added"},
            {"added": true, "expression": "/orgs/CIEL/sources/CIEL/concepts/1000/", "message": "Added"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&server);
    let concepts = [ConceptRef::from_id(CIEL, "1000")];
    assert!(
        orchestrator
            .add_concepts_to_collection("/users/admin/collections/MC/", &concepts, false)
            .await
    );

    let added = orchestrator.state().added_references("/users/admin/collections/MC/");
    assert_eq!(added.len(), 2);
    assert!(added.iter().all(|r| r.added));
}
