use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

/// Body returned by `/users` for any failure.
pub const FAILURE_MESSAGE: &str = "Failed to load resource";

/// Handlers answer 200 with the bare value as the JSON body, no envelope.
pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}
