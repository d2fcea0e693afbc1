use modelmgmt_engine::mock::StaticProvider;
use modelmgmt_engine::{ManagerConfig, MemoryChangeLog, ModelManager};
use modelmgmt_model::{ModelClass, ModelDefinition, ModelField, ModelRegion, ModelsMetaInfo};
use modelmgmt_server::{build_router, HealthResponse};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

const TITLE: &str = "definition=PR0001/field=title";

fn test_provider() -> Arc<StaticProvider> {
    Arc::new(StaticProvider::new(
        vec![
            ModelClass::new("emf:Entity").with_label("en", "Entity"),
            ModelClass::new("emf:Case").with_parent("emf:Entity"),
        ],
        vec![
            ModelDefinition::new("base")
                .with_abstract(true)
                .with_region(ModelRegion::new("previousRegion"))
                .with_region(ModelRegion::new("newRegion")),
            ModelDefinition::new("PR0001")
                .with_parent("base")
                .with_rdf_type("emf:Case")
                .with_field(ModelField::new("title").with_region("previousRegion"))
                .with_field(ModelField::new("description")),
        ],
    ))
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server() -> String {
    let provider = test_provider();
    let manager = ModelManager::load(
        ManagerConfig::default(),
        provider.clone(),
        provider,
        Arc::new(MemoryChangeLog::new()),
    )
    .await
    .unwrap();

    let app = build_router(Arc::new(manager));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn post(base: &str, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .json(&body)
        .send()
        .await
        .unwrap()
}

fn move_title(version: u64, old: &str, new: &str) -> Value {
    json!({
        "modelVersion": version,
        "changes": [{
            "selector": TITLE,
            "operation": "assignToRegion",
            "oldValue": old,
            "newValue": new,
        }]
    })
}

// ── Reads ────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_version() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: HealthResponse = resp.json().await.unwrap();
    assert_eq!(
        body,
        HealthResponse {
            status: "ok".into(),
            version: 0
        }
    );
}

#[tokio::test]
async fn hierarchy_nests_definitions_under_classes() {
    let base = spawn_test_server().await;
    let body: Value = reqwest::get(format!("{}/model-management/hierarchy", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["id"], "emf:Entity");
    assert_eq!(classes[0]["subTypes"], json!([]));
    assert_eq!(classes[1]["parentId"], "emf:Entity");
    assert_eq!(classes[1]["subTypes"][0]["id"], "PR0001");
}

#[tokio::test]
async fn meta_info_lists_catalog() {
    let base = spawn_test_server().await;
    let body: ModelsMetaInfo = reqwest::get(format!("{}/model-management/meta-info", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, ModelsMetaInfo::standard());
}

#[tokio::test]
async fn model_query_returns_lineage() {
    let base = spawn_test_server().await;
    let body: Value = reqwest::get(format!("{}/model-management?model=PR0001", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<&str> = body["definitions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["PR0001", "base"]);
    assert_eq!(body["classes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn model_query_requires_model_parameter() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/model-management", base)).await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/api/v1/nonexistent", base)).await.unwrap();
    assert_eq!(resp.status(), 404);
}

// ── Updates ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_commits_and_returns_changes() {
    let base = spawn_test_server().await;
    let resp = post(&base, "/model-management", move_title(0, "previousRegion", "newRegion")).await;

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["modelVersion"], 1);
    assert_eq!(body["changeSets"][0]["id"], 1);
    assert_eq!(body["changeSets"][0]["status"], "draft");
    assert_eq!(body["changeSets"][0]["changeSet"]["newValue"], "newRegion");
}

#[tokio::test]
async fn stale_update_returns_409_with_every_collision() {
    let base = spawn_test_server().await;
    post(&base, "/model-management", move_title(0, "previousRegion", "newRegion")).await;

    let resp = post(&base, "/model-management", move_title(0, "previousRegion", "previousRegion")).await;

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 0);
    assert!(body["message"].as_str().unwrap().contains("collide"));
    let entry = &body["errors"][TITLE];
    assert_eq!(entry["type"], "collision");
    assert_eq!(entry["error"], true);
    assert_eq!(entry["message"], r#"expected "previousRegion", found "newRegion""#);
    assert_eq!(body["errors"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_update_returns_400() {
    let base = spawn_test_server().await;
    let resp = post(&base, "/model-management", move_title(0, "previousRegion", "nowhere")).await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][TITLE]["type"], "validation");
    assert_eq!(body["errors"][TITLE]["message"], "unknown region 'nowhere'");

    let health: HealthResponse = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.version, 0);
}

#[tokio::test]
async fn unresolved_selector_returns_404() {
    let base = spawn_test_server().await;
    let body = json!({
        "modelVersion": 0,
        "changes": [{
            "selector": "definition=PR0001/field=missing",
            "operation": "setDefaultValue",
            "newValue": "x",
        }]
    });
    let resp = post(&base, "/model-management", body).await;

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["definition=PR0001/field=missing"]["type"], "notFound");
}

// ── Deployment ───────────────────────────────────────────────────

#[tokio::test]
async fn deploy_lists_candidates_and_promotes() {
    let base = spawn_test_server().await;
    post(&base, "/model-management", move_title(0, "previousRegion", "newRegion")).await;

    let candidates: Value = reqwest::get(format!("{}/model-management/deploy", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(candidates[0]["id"], "PR0001");
    assert_eq!(candidates[0]["changeSets"], json!([1]));

    let resp = post(
        &base,
        "/model-management/deploy",
        json!({"modelsToDeploy": ["1"], "version": 0}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["version"], 1);
    assert_eq!(body["pending"], json!([]));
    assert_eq!(body["deployed"][0]["status"], "deployed");
}

#[tokio::test]
async fn empty_deployment_returns_400() {
    let base = spawn_test_server().await;
    let resp = post(
        &base,
        "/model-management/deploy",
        json!({"modelsToDeploy": [], "version": 7}),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], 0);
    assert_eq!(body["errors"], json!({}));
}
