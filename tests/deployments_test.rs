//! Integration tests for deployments and deployment watching.

use async_trait::async_trait;
use popsigner_api::{
    ArtifactType, Client, ClientConfig, CreateDeploymentRequest, DeploymentStatus,
    PopSignerError, Sleeper, Stack,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT_ID: &str = "3f1c2a9e-5b7d-4e11-9a0c-000000000001";

fn create_mock_deployment(status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": DEPLOYMENT_ID,
        "chain_id": 42069,
        "stack": "opstack",
        "status": status,
        "current_stage": if status == "running" { Some("deploy_contracts") } else { None },
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:01:00Z"
    })
}

fn client_for(server: &MockServer) -> Client {
    Client::with_config(
        "test_key",
        ClientConfig {
            base_url: Some(server.uri()),
            ..Default::default()
        },
    )
    .unwrap()
}

#[derive(Default)]
struct CountingSleeper {
    sleeps: AtomicUsize,
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_create_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/deployments"))
        .and(body_json(serde_json::json!({
            "chain_id": 42069,
            "stack": "opstack",
            "config": { "chain_name": "my-rollup" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": create_mock_deployment("pending")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let deployment = client
        .deployments()
        .create(CreateDeploymentRequest {
            chain_id: 42069,
            stack: Stack::OpStack,
            config: serde_json::json!({ "chain_name": "my-rollup" }),
        })
        .await
        .unwrap();

    assert_eq!(deployment.id, DEPLOYMENT_ID);
    assert_eq!(deployment.status, DeploymentStatus::Pending);
}

#[tokio::test]
async fn test_list_deployments_status_filter() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [create_mock_deployment("running")]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    client.deployments().list(None).await.unwrap();
    let running = client
        .deployments()
        .list(Some(&DeploymentStatus::Running))
        .await
        .unwrap();
    assert_eq!(running[0].current_stage.as_deref(), Some("deploy_contracts"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.query(), None);
    let pairs: Vec<(String, String)> = requests[1]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(pairs, vec![("status".to_string(), "running".to_string())]);
}

#[tokio::test]
async fn test_start_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/deployments/{}/start", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "data": { "status": "started", "message": "Deployment started." }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let started = client.deployments().start(DEPLOYMENT_ID).await.unwrap().unwrap();
    assert_eq!(started.status, "started");
}

#[tokio::test]
async fn test_start_accepted_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/deployments/{}/start", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let started = client.deployments().start(DEPLOYMENT_ID).await.unwrap();
    assert!(started.is_none());
}

#[tokio::test]
async fn test_resume_paused_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": create_mock_deployment("paused")
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/deployments/{}/start", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    assert!(client.deployments().resume(DEPLOYMENT_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_resume_refuses_running_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": create_mock_deployment("running")
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/deployments/{}/start", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client.deployments().resume(DEPLOYMENT_ID).await.unwrap_err();
    assert!(matches!(err, PopSignerError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_artifacts_and_transactions() {
    let mock_server = MockServer::start().await;
    let base = format!("/v1/deployments/{}", DEPLOYMENT_ID);

    Mock::given(method("GET"))
        .and(path(format!("{}/artifacts", base)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "artifacts": [
                    { "type": "genesis", "content": { "config": {} } },
                    { "type": "rollup_config", "content": { "block_time": 2 } }
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/artifacts/rollup_config", base)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "type": "rollup_config", "content": { "block_time": 2 } }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/transactions", base)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{
                "id": "tx-1",
                "stage": "deploy_contracts",
                "tx_hash": "0xabc",
                "contract_name": "OptimismPortal",
                "created_at": "2025-01-01T00:02:00Z"
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let deployments = client.deployments();

    let artifacts = deployments.artifacts(DEPLOYMENT_ID).await.unwrap();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[1].artifact_type, ArtifactType::RollupConfig);

    let rollup = deployments
        .artifact(DEPLOYMENT_ID, &ArtifactType::RollupConfig)
        .await
        .unwrap();
    assert_eq!(rollup.content["block_time"], 2);

    let txs = deployments.transactions(DEPLOYMENT_ID).await.unwrap();
    assert_eq!(txs[0].tx_hash, "0xabc");
    assert_eq!(txs[0].contract_name.as_deref(), Some("OptimismPortal"));
}

#[tokio::test]
async fn test_bundle_returns_raw_bytes() {
    let mock_server = MockServer::start().await;
    let archive = vec![0x1f, 0x8b, 0x08, 0x00, 0x00];

    // Matched first if the download asks for JSON.
    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}/bundle", DEPLOYMENT_ID)))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(406))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}/bundle", DEPLOYMENT_ID)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/gzip")
                .set_body_bytes(archive.clone()),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let bytes = client.deployments().bundle(DEPLOYMENT_ID).await.unwrap();
    assert_eq!(bytes, archive);
}

#[tokio::test]
async fn test_invalid_deployment_id_issues_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for bad in ["", "../keys", "abc/def", "id?status=failed"] {
        let err = client.deployments().get(bad).await.unwrap_err();
        assert!(matches!(err, PopSignerError::InvalidRequest(_)), "{}", bad);
    }
}

#[tokio::test]
async fn test_watch_stops_after_completed() {
    let mock_server = MockServer::start().await;
    let get_path = format!("/v1/deployments/{}", DEPLOYMENT_ID);

    // Mocks are matched in mount order; each answers once.
    for status in ["pending", "running", "completed"] {
        Mock::given(method("GET"))
            .and(path(get_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": create_mock_deployment(status)
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let sleeper = Arc::new(CountingSleeper::default());

    let mut seen = Vec::new();
    let last = client
        .deployments()
        .watch(DEPLOYMENT_ID)
        .sleeper(sleeper.clone())
        .wait_for_terminal(|d| seen.push(d.status.clone()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(last.status, DeploymentStatus::Completed);
    assert_eq!(
        seen,
        vec![
            DeploymentStatus::Pending,
            DeploymentStatus::Running,
            DeploymentStatus::Completed
        ]
    );
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_watch_already_failed_does_not_sleep() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": create_mock_deployment("failed")
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let sleeper = Arc::new(CountingSleeper::default());

    let mut watcher = client
        .deployments()
        .watch(DEPLOYMENT_ID)
        .sleeper(sleeper.clone());

    let first = watcher.next().await.unwrap().unwrap();
    assert_eq!(first.status, DeploymentStatus::Failed);
    assert!(watcher.next().await.is_none());
    assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_watch_surfaces_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/deployments/{}", DEPLOYMENT_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "not_found", "message": "deployment not found" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client
        .deployments()
        .watch(DEPLOYMENT_ID)
        .interval(Duration::from_millis(1))
        .wait_for_terminal(|_| {})
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}
