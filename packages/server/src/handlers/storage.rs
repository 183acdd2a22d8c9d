use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::{ObjectName, validate_bucket};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/storage/{bucket}/{filename}",
    tag = "Storage",
    operation_id = "getObject",
    summary = "Fetch a stored object",
    description = "Public download URL target for uploaded images.",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("filename" = String, Path, description = "Object name"),
    ),
    responses(
        (status = 200, description = "Object content"),
        (status = 404, description = "Object not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_object(
    State(state): State<AppState>,
    Path((bucket, filename)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let bucket = validate_bucket(&bucket)?;
    let name = ObjectName::parse(&filename)?;

    let reader = state.objects.get_stream(bucket, &name).await?;
    let body = Body::from_stream(ReaderStream::new(reader));
    let mime = mime_guess::from_path(name.as_str()).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
