//! Request handlers for the review API

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use critic_core::{ReviewRecord, SubmittedReview, Upload};
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::{ApiError, Operation};
use crate::state::AppState;

/// Multipart field carrying the file under review
pub const UPLOAD_FIELD: &str = "file";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/review`
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmittedReview>, ApiError> {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await?,
        Err(rejection) => {
            debug!(%rejection, "Request is not a multipart upload");
            None
        }
    };

    state
        .submission
        .submit(Some(&user), upload)
        .await
        .map(Json)
        .map_err(|e| state.error(Operation::SubmitReview, e))
}

/// `GET /api/reports`
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Vec<ReviewRecord>>, ApiError> {
    state
        .retrieval
        .list(Some(&user))
        .await
        .map(Json)
        .map_err(|e| state.error(Operation::ListReports, e))
}

/// `GET /api/reports/{id}`
pub async fn get_report(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ReviewRecord>, ApiError> {
    state
        .retrieval
        .get(&id, Some(&user))
        .await
        .map(Json)
        .map_err(|e| state.error(Operation::GetReport, e))
}

/// First file sent in the upload field, if any.
///
/// Malformed bodies count as no upload; only an exceeded size limit is
/// reported separately.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return unreadable(e),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A plain form value under the same name is not a file
        let Some(filename) = field.file_name().map(str::to_string) else {
            return Ok(None);
        };

        return match field.bytes().await {
            Ok(content) => {
                debug!(filename = %filename, bytes = content.len(), "Received upload");
                Ok(Some(Upload::new(filename, content.to_vec())))
            }
            Err(e) => unreadable(e),
        };
    }
}

fn unreadable(err: MultipartError) -> Result<Option<Upload>, ApiError> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Err(ApiError::PayloadTooLarge);
    }
    debug!(error = %err, "Discarding malformed multipart body");
    Ok(None)
}
