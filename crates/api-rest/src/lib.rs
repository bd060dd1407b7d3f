//! # API REST
//!
//! REST API for the FHIR extraction service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Extraction is blocking filesystem work, so requests run it on the blocking thread pool.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{ExtractReq, ExtractRes, HealthRes, IssueRes, RowRes, SummaryRes};
use extract_core::{ExtractError, ExtractResult, ExtractionService};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ExtractionService>,
}

impl AppState {
    pub fn new(service: ExtractionService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, extract),
    components(schemas(HealthRes, ExtractReq, ExtractRes, RowRes, IssueRes, SummaryRes))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "FHIR extract REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/extract",
    request_body = ExtractReq,
    responses(
        (status = 200, description = "Linked rows and per-document issues", body = ExtractRes),
        (status = 400, description = "An input directory could not be read"),
        (status = 500, description = "Internal server error")
    )
)]
/// Extract reports, observations and conditions from server-side directories and link them.
///
/// # Errors
/// Returns `400 Bad Request` if an input directory cannot be listed, and
/// `500 Internal Server Error` for anything else.
#[axum::debug_handler]
async fn extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractReq>,
) -> Result<Json<ExtractRes>, (StatusCode, String)> {
    let service = state.service.clone();
    let joined = tokio::task::spawn_blocking(move || run_extract(&service, req)).await;

    match joined {
        Ok(Ok(res)) => Ok(Json(res)),
        Ok(Err(e)) => {
            tracing::error!("Extract error: {}", e);
            Err(error_status(&e))
        }
        Err(e) => {
            tracing::error!("Extract task failed: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
        }
    }
}

/// Run one extraction synchronously and build the response body.
pub fn run_extract(service: &ExtractionService, req: ExtractReq) -> ExtractResult<ExtractRes> {
    let outcome = service.link(&req.into_request())?;
    Ok(ExtractRes::from(&outcome))
}

fn error_status(err: &ExtractError) -> (StatusCode, String) {
    match err {
        ExtractError::InvalidInput(_) | ExtractError::DirectoryRead { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()),
    }
}
