//! Image upload.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::error::{BoardError, ValidationError};
use crate::media::extension_for;

const IMAGE_FIELD: &str = "image";

fn multipart_error(err: &MultipartError, limit: u64) -> BoardError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ValidationError::TooLarge {
            field: IMAGE_FIELD,
            limit,
        }
        .into();
    }
    ValidationError::Malformed(err.body_text()).into()
}

/// Accept one multipart `image` file and return its public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, BoardError> {
    let mut multipart = multipart.map_err(|e| ValidationError::Malformed(e.body_text()))?;
    let limit = state.images.max_bytes();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(&e, limit)),
        };
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let declared = content_type.as_deref().unwrap_or("application/octet-stream");
        if extension_for(declared).is_none() {
            return Err(ValidationError::UnsupportedMedia(declared.to_string()).into());
        }
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e, limit))?;
        let url = state.images.save_image(&bytes, content_type.as_deref()).await?;
        return Ok(Json(json!({ "url": url })));
    }

    Err(ValidationError::MissingField(IMAGE_FIELD).into())
}
