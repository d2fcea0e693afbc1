//! REST surface for model management.

mod config;
mod error;
mod seed;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody, ErrorEntry};
pub use seed::SeedProvider;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use modelmgmt_engine::{DeployedModels, DeploymentCandidate, EngineResult, ModelManager};
use modelmgmt_model::{
    ModelDeploymentRequest, ModelHierarchyClass, ModelResponse, ModelUpdateRequest,
    ModelUpdateResponse, ModelsMetaInfo,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: u64,
}

#[derive(Deserialize, Debug)]
pub struct ModelQuery {
    pub model: String,
}

async fn health_handler(State(manager): State<Arc<ModelManager>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: manager.version(),
    })
}

async fn hierarchy_handler(State(manager): State<Arc<ModelManager>>) -> Json<Vec<ModelHierarchyClass>> {
    Json(manager.hierarchy())
}

async fn meta_info_handler(State(manager): State<Arc<ModelManager>>) -> Json<ModelsMetaInfo> {
    Json(manager.meta_info())
}

async fn model_handler(
    State(manager): State<Arc<ModelManager>>,
    Query(query): Query<ModelQuery>,
) -> Json<ModelResponse> {
    Json(manager.select(&query.model))
}

async fn update_handler(
    State(manager): State<Arc<ModelManager>>,
    Json(request): Json<ModelUpdateRequest>,
) -> Result<Json<ModelUpdateResponse>, ApiError> {
    blocking(move || manager.update(&request)).await.map(Json)
}

async fn candidates_handler(State(manager): State<Arc<ModelManager>>) -> Json<Vec<DeploymentCandidate>> {
    Json(manager.deployment_candidates())
}

async fn deploy_handler(
    State(manager): State<Arc<ModelManager>>,
    Json(request): Json<ModelDeploymentRequest>,
) -> Result<Json<DeployedModels>, ApiError> {
    blocking(move || manager.deploy(&request)).await.map(Json)
}

/// Runs a writer off the async workers; the manager serializes writers on a
/// blocking lock.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> EngineResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(ApiError::internal(format!("writer task failed: {e}"))),
    }
}

/// Build the HTTP API router around a loaded manager.
pub fn build_router(manager: Arc<ModelManager>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/model-management", get(model_handler).post(update_handler))
        .route("/model-management/hierarchy", get(hierarchy_handler))
        .route("/model-management/meta-info", get(meta_info_handler))
        .route(
            "/model-management/deploy",
            get(candidates_handler).post(deploy_handler),
        )
        .with_state(manager)
}
