//! API route definitions

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{self, HealthResponse};
use crate::logging::OperationLog;
use crate::types::{CalcResponse, ErrorResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calculator API",
        version = "0.1.0",
        description = "Arithmetic operations over HTTP query parameters"
    ),
    tags(
        (name = "arithmetic", description = "Arithmetic operations"),
        (name = "health", description = "Health checks")
    ),
    paths(
        handlers::health,
        handlers::add,
        handlers::subtract,
        handlers::multiply,
        handlers::divide,
        handlers::power,
        handlers::sqrt,
        handlers::modulo,
    ),
    components(schemas(CalcResponse, ErrorResponse, HealthResponse))
)]
pub struct ApiDoc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub log: OperationLog,
}

impl AppState {
    pub fn new(log: OperationLog) -> Self {
        Self { log }
    }
}

/// Create the API router
///
/// Each route carries the 404 fallback for methods other than GET, so a
/// `POST /add` is answered exactly like an unknown path.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Arithmetic
        .route("/add", get(handlers::add).fallback(handlers::not_found))
        .route("/subtract", get(handlers::subtract).fallback(handlers::not_found))
        .route("/multiply", get(handlers::multiply).fallback(handlers::not_found))
        .route("/divide", get(handlers::divide).fallback(handlers::not_found))
        .route("/power", get(handlers::power).fallback(handlers::not_found))
        .route("/sqrt", get(handlers::sqrt).fallback(handlers::not_found))
        .route("/modulo", get(handlers::modulo).fallback(handlers::not_found))

        // Health
        .route("/health", get(handlers::health).fallback(handlers::not_found))

        // OpenAPI document
        .route("/api/openapi.json", get(handlers::openapi).fallback(handlers::not_found))

        .fallback(handlers::not_found)

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
