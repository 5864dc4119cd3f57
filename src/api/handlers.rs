use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::decode::DecodedNumber;
use crate::contracts::{InputError, NumberStore, StorageError};

/// Application state shared across handlers.
///
/// Built once at startup and handed to the router; handlers never reach the
/// store through anything else.
pub struct AppState<S: NumberStore> {
    pub store: Arc<S>,
}

impl<S: NumberStore + 'static> AppState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Runs a store call on the blocking pool so disk I/O never stalls a
    /// runtime worker.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, StorageError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&*store))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }

    async fn sorted_numbers(&self) -> Result<Vec<i64>, ApiError> {
        self.with_store(|store| store.list_sorted())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to retrieve numbers");
                ApiError::from(e)
            })
    }
}

/// Response carrying the full sorted collection.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumbersResponse {
    pub numbers: Vec<i64>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    Input(InputError),
    Storage(StorageError),
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Input(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: e.code().into(),
                }),
            )
                .into_response(),
            // The cause is logged where it happened; clients only see a generic message.
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "storage unavailable".into(),
                    code: "STORAGE_ERROR".into(),
                }),
            )
                .into_response(),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET, POST")],
                Json(ErrorResponse {
                    error: "method not allowed".into(),
                    code: "METHOD_NOT_ALLOWED".into(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        ApiError::Input(e)
    }
}

/// POST /numbers
/// Stores one number and returns the whole collection, sorted.
/// Accepts either:
/// - Content-Type: application/json with body `{"number": <int>}`
/// - any other content type with query parameter `number=<int>`
///
/// A body that cannot be buffered (e.g. over the size limit) is an input
/// error on the JSON path and ignored on the query path.
pub async fn add_number<S: NumberStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<NumbersResponse>, ApiError> {
    let body = body.map_err(|rejection| rejection.body_text());
    let body = body.as_deref().map_err(String::as_str);
    let value = DecodedNumber::decode(&headers, query.as_deref(), body)
        .into_result()
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected number input");
            ApiError::from(e)
        })?;

    state
        .with_store(move |store| store.insert(value))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, value, "Failed to save number");
            ApiError::from(e)
        })?;

    let numbers = state.sorted_numbers().await?;
    Ok(Json(NumbersResponse { numbers }))
}

/// GET /numbers
/// Returns every stored number in ascending order.
pub async fn list_numbers<S: NumberStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<NumbersResponse>, ApiError> {
    let numbers = state.sorted_numbers().await?;
    Ok(Json(NumbersResponse { numbers }))
}

/// Any other method on /numbers.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// GET /health
/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy"
    }))
}
