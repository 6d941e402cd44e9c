//! API request handlers

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use super::routes::{ApiDoc, AppState};
use crate::calc::{self, CalcError};
use crate::types::{CalcResponse, ErrorResponse, Operands, Operation};

/// Body returned for any path or method the service does not serve
pub const INVALID_ENDPOINT: &str = "Invalid endpoint. Use /add, /subtract, /multiply, /divide, /power, /sqrt, or /modulo with the appropriate parameters";

// Query parameters

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BinaryParams {
    /// First operand
    pub num1: Option<String>,
    /// Second operand
    pub num2: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnaryParams {
    /// Operand
    pub num: Option<String>,
}

impl From<BinaryParams> for Operands {
    fn from(params: BinaryParams) -> Self {
        Operands::Binary {
            num1: params.num1,
            num2: params.num2,
        }
    }
}

impl From<UnaryParams> for Operands {
    fn from(params: UnaryParams) -> Self {
        Operands::Unary { num: params.num }
    }
}

// Response types

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
}

type ApiResult = Result<Json<CalcResponse>, (StatusCode, Json<ErrorResponse>)>;

// A query string that does not deserialize (e.g. a repeated key) is treated
// as missing operands so it is rejected by the validator like any other bad input.
fn binary(params: Result<Query<BinaryParams>, QueryRejection>) -> Operands {
    params.map(|Query(p)| p).unwrap_or_default().into()
}

fn unary(params: Result<Query<UnaryParams>, QueryRejection>) -> Operands {
    params.map(|Query(p)| p).unwrap_or_default().into()
}

/// Log the request, validate, compute, and shape the response.
pub(crate) fn run(state: &AppState, op: Operation, operands: Operands) -> ApiResult {
    state.log.requested(op, &operands);

    match calc::evaluate(op, &operands) {
        Ok(result) => Ok(Json(CalcResponse { result })),
        Err(err) => {
            state.log.rejected(op, &operands, err);
            Err(bad_request(err))
        }
    }
}

fn bad_request(err: CalcError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(err.to_string())),
    )
}

// Handlers

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// OpenAPI document for this service
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Add two numbers
#[utoipa::path(
    get,
    path = "/add",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 + num2", body = CalcResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn add(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Add, binary(params))
}

/// Subtract the second number from the first
#[utoipa::path(
    get,
    path = "/subtract",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 - num2", body = CalcResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn subtract(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Subtract, binary(params))
}

/// Multiply two numbers
#[utoipa::path(
    get,
    path = "/multiply",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 * num2", body = CalcResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn multiply(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Multiply, binary(params))
}

/// Divide the first number by the second
#[utoipa::path(
    get,
    path = "/divide",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 / num2", body = CalcResponse),
        (status = 400, description = "Invalid input or division by zero", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn divide(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Divide, binary(params))
}

/// Raise the first number to the power of the second
#[utoipa::path(
    get,
    path = "/power",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 ^ num2", body = CalcResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn power(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Power, binary(params))
}

/// Square root of a non-negative number
#[utoipa::path(
    get,
    path = "/sqrt",
    params(UnaryParams),
    responses(
        (status = 200, description = "√num", body = CalcResponse),
        (status = 400, description = "Invalid input or negative operand", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn sqrt(
    State(state): State<AppState>,
    params: Result<Query<UnaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Sqrt, unary(params))
}

/// Remainder of the first number divided by the second
#[utoipa::path(
    get,
    path = "/modulo",
    params(BinaryParams),
    responses(
        (status = 200, description = "num1 % num2", body = CalcResponse),
        (status = 400, description = "Invalid input or modulo by zero", body = ErrorResponse)
    ),
    tag = "arithmetic"
)]
pub async fn modulo(
    State(state): State<AppState>,
    params: Result<Query<BinaryParams>, QueryRejection>,
) -> ApiResult {
    run(&state, Operation::Modulo, binary(params))
}

/// Fallback for unknown paths and unsupported methods
pub async fn not_found(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<ErrorResponse>) {
    state.log.invalid_endpoint(&uri.to_string());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(INVALID_ENDPOINT)),
    )
}
