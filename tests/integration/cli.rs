use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `ocl-dict` isolated from the user's configuration and environment.
fn ocl_dict(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ocl-dict").unwrap();
    cmd.arg("--config")
        .arg(config_dir.path().join("config.toml"))
        .env_remove("OCL_API_URL")
        .env_remove("OCL_API_TOKEN")
        .env_remove("RUST_LOG")
        .env("OCL_NO_PROGRESS", "1");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("ocl-dict")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("add-concepts"))
        .stdout(predicate::str::contains("remove-references"));
}

#[test]
fn test_config_path_honours_flag() {
    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show_masks_token() {
    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created global config"));
    assert!(temp.path().join("config.toml").exists());

    ocl_dict(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_url"))
        .stdout(predicate::str::contains("YOUR_API_TOKEN").not());
}

#[test]
fn test_add_concepts_without_ids_fails_before_any_request() {
    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["--api-url", "http://127.0.0.1:9", "add-concepts", "/users/admin/collections/MC/"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No concept identifiers"));
}

#[test]
fn test_create_requires_owner() {
    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["create", "--user", "a", "--org", "b", "--name", "X", "--short-code", "X"])
        .assert()
        .failure();
}

#[tokio::test]
async fn test_create_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/admin/sources/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "MCSource", "url": "/users/admin/sources/MCSource/"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/admin/collections/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "MC", "url": "/users/admin/collections/MC/"
        })))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["--api-url", &server.uri(), "create", "--user", "admin"])
        .args(["--name", "Malaria Clinic", "--short-code", "MC", "--locales", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created dictionary Malaria Clinic"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_show_missing_dictionary_suggests_fix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/admin/collections/NOPE/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    ocl_dict(&temp)
        .args(["--api-url", &server.uri(), "show", "/users/admin/dictionaries/NOPE/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 404"))
        .stderr(predicate::str::contains("suggestion"));
}
