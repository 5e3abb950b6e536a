//! JSON error bodies and request extractors that reject with them.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::error::{BoardError, ValidationError};

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, axum::Json(body)).into_response()
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_internal() {
            tracing::error!(error = %self, "request failed");
            let body = serde_json::json!({
                "error": self.client_message(),
                "message": "service temporarily unavailable",
            });
            return (status, axum::Json(body)).into_response();
        }
        tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        api_error(status, self.client_message())
    }
}

/// `axum::Json` whose rejection is a 400 JSON error like every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BoardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(malformed(rejection)),
        }
    }
}

fn malformed(rejection: JsonRejection) -> BoardError {
    ValidationError::Malformed(rejection.body_text()).into()
}

/// Numeric id from the single path parameter.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = BoardError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ValidationError::Malformed(e.body_text()))?;
        raw.parse::<i64>()
            .map(IdPath)
            .map_err(|_| ValidationError::Malformed(format!("invalid id: {raw}")).into())
    }
}
