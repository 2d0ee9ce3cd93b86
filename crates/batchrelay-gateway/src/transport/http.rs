//! HTTP batch endpoint.
//!
//! One route per integration. The forwarder is attached to the route as an
//! `Extension`, so the handler does not need to look it up by name.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

use batchrelay_core::error::{ClientCode, RelayError};
use batchrelay_core::protocol::batch::BatchRequest;
use batchrelay_core::protocol::outcome::BatchResult;

use crate::dispatch::BatchForwarder;

/// 200 body: `status: "done"` plus the flattened batch result.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: BatchResult,
}

impl BatchResponse {
    pub fn done(result: BatchResult) -> Self {
        Self {
            status: "done",
            result,
        }
    }
}

/// Call-level failure rendered as JSON with the matching status code.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            RelayError::BatchTooLarge { max, received } => json!({
                "code": code.as_str(),
                "message": self.0.to_string(),
                "max": max,
                "received": received,
            }),
            RelayError::Internal(_) => json!({
                "code": code.as_str(),
                "message": "Unexpected error in relay",
                "error": self.0.to_string(),
            }),
            other => json!({
                "code": code.as_str(),
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub async fn submit_batch(
    Extension(fwd): Extension<Arc<BatchForwarder>>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch = BatchRequest::from_slice(&body)
        .and_then(BatchRequest::into_batch)
        .and_then(|b| fwd.check_shape(&b.records).map(|()| b))
        .map_err(|e| fwd.reject(e))?;

    let result = fwd.process_detached(batch).await?;
    Ok(Json(BatchResponse::done(result)))
}

/// Any non-POST method on a batch route.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static("POST"))],
        Json(json!({
            "code": ClientCode::MethodNotAllowed.as_str(),
            "message": "Method not allowed",
        })),
    )
        .into_response()
}
