use std::path::Path as FsPath;

use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use common::storage::{BoxReader, ObjectName};
use listing::{BucketResolver, UploadCoordinator, Uploaded};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::product::{ImageUploadResponse, ImageUrlResponse};
use crate::state::AppState;

/// Multipart framing allowance on top of the image size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn image_upload_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let max = usize::try_from(storage.max_object_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(MULTIPART_OVERHEAD))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/images",
    tag = "Product Images",
    operation_id = "uploadProductImage",
    summary = "Upload a product image",
    description = "Stores the `file` multipart field under a randomised name in the product \
        image bucket, then resolves its public URL. Only image files are accepted.",
    request_body(content_type = "multipart/form-data", description = "Image file in the `file` field"),
    responses(
        (status = 201, description = "Image stored and resolved", body = ImageUploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not signed in (LOGIN_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Not an image (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, user, headers, multipart), fields(uid = %user.uid))]
pub async fn upload_image(
    user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let expected_len = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let storage = &state.config.storage;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, storage.max_object_size))?
    {
        if field.name() != Some("file") {
            continue; // Ignore unknown fields.
        }

        let original = field.file_name().map(str::to_owned);
        if !is_image(field.content_type(), original.as_deref()) {
            return Err(AppError::UnsupportedMediaType(
                "Only image files can be uploaded".into(),
            ));
        }

        let mut coordinator = UploadCoordinator::new();
        coordinator.start();

        let name = ObjectName::randomized(original.as_deref());
        let size = match stream_field_to_store(field, &state, &name, expected_len, &mut coordinator)
            .await
        {
            Ok(size) => size,
            Err(e) => {
                coordinator.fail("the image could not be stored");
                return Err(e);
            }
        };

        let uploaded = coordinator.succeed(name.clone())?;
        let resolver = BucketResolver::new(&*state.objects, &storage.bucket);
        let image = match coordinator.resolve(uploaded, &resolver).await {
            Ok(image) => image.clone(),
            Err(e) => {
                discard(&state, &name).await;
                return Err(e.into());
            }
        };
        let upload_state = coordinator.state();

        return Ok((
            StatusCode::CREATED,
            Json(ImageUploadResponse {
                filename: image.filename().to_string(),
                url: image.url().to_owned(),
                status: upload_state.status.as_str(),
                progress: upload_state.progress,
                size,
            }),
        ));
    }

    Err(AppError::Validation("Missing 'file' field".into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/images/{filename}/url",
    tag = "Product Images",
    operation_id = "getProductImageUrl",
    summary = "Resolve the public URL of an uploaded image",
    params(("filename" = String, Path, description = "Object name returned by the upload")),
    responses(
        (status = 200, description = "Public URL", body = ImageUrlResponse),
        (status = 400, description = "Invalid name (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No such image (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn image_url(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ImageUrlResponse>, AppError> {
    let name = ObjectName::parse(&filename)?;
    let resolver = BucketResolver::new(&*state.objects, &state.config.storage.bucket);
    let image = Uploaded::existing(name).resolve(&resolver).await?;

    Ok(Json(ImageUrlResponse {
        url: image.url().to_owned(),
    }))
}

fn is_image(content_type: Option<&str>, filename: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return true;
    }
    filename
        .and_then(|f| mime_guess::from_path(f).first())
        .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE)
}

/// A body that outgrew the route's limit surfaces as a multipart error
/// carrying 413.
fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

/// Spool the field to a temp file, then hand it to the object store.
async fn stream_field_to_store(
    field: Field<'_>,
    state: &AppState,
    name: &ObjectName,
    expected_len: Option<u64>,
    coordinator: &mut UploadCoordinator,
) -> Result<u64, AppError> {
    let temp_path = std::env::temp_dir().join(format!("showcase-upload-{}", Uuid::new_v4()));

    let result = spool_and_store(field, state, name, &temp_path, expected_len, coordinator).await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

async fn spool_and_store(
    mut field: Field<'_>,
    state: &AppState,
    name: &ObjectName,
    temp_path: &FsPath,
    expected_len: Option<u64>,
    coordinator: &mut UploadCoordinator,
) -> Result<u64, AppError> {
    let storage = &state.config.storage;
    let max_size = storage.max_object_size;

    let mut temp_file = tokio::fs::File::create(temp_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    let mut received: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        received += chunk.len() as u64;
        if received > max_size {
            return Err(AppError::PayloadTooLarge { limit: max_size });
        }
        temp_file
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;

        if let Some(total) = expected_len.filter(|t| *t > 0) {
            // The body also carries multipart framing, so stop short of 100
            // until the object is actually stored.
            let percent = (received.saturating_mul(100) / total).min(99);
            coordinator.progress_to(u8::try_from(percent).unwrap_or(99));
            debug!(received, total, percent, "Upload progress");
        }
    }

    temp_file
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
    drop(temp_file);

    let file = tokio::fs::File::open(temp_path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
    let reader: BoxReader = Box::new(file);

    Ok(state.objects.put_stream(&storage.bucket, name, reader).await?)
}

/// Remove an object whose URL could not be resolved.
async fn discard(state: &AppState, name: &ObjectName) {
    let bucket = &state.config.storage.bucket;
    match state.objects.delete(bucket, name).await {
        Ok(_) => debug!(object = %name, "Removed unresolved upload"),
        Err(e) => warn!(object = %name, error = %e, "Failed to remove unresolved upload"),
    }
}
