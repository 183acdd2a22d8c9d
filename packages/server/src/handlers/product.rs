use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::{ObjectName, StorageError};
use common::{ProductDraft, validate_create_product};
use listing::{
    BucketResolver, FormController, ImageRef, NavigationLog, SubmissionAction, SubmissionError,
    SubmissionOutcome, UploadError, Uploaded,
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::MaybeAuthUser;
use crate::extractors::json::AppJson;
use crate::models::product::{
    CreateProductRequest, CreateProductResponse, ProductListResponse, ProductResponse,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a new product",
    description = "Validates the draft, attaches the uploaded image (if any) and appends the \
        product to the collection on behalf of the signed-in user. Without a bearer token \
        nothing is saved and the response points the client to `/login`.",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = CreateProductResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not signed in (LOGIN_REQUIRED) or bad token (TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Another submission by the same user is in flight (CONFLICT)", body = ErrorBody),
        (status = 500, description = "Product could not be saved (SAVE_FAILED)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, user, payload), fields(name = %payload.name))]
pub async fn create_product(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut form = FormController::new(payload.to_draft(), validate_create_product);
    let mut draft = form
        .submit(ProductDraft::clone)
        .map_err(AppError::InvalidFields)?;

    let session = user.into_session();
    let _in_flight = match session.identity() {
        Some(identity) => Some(
            state
                .submissions
                .try_begin(&identity.uid)
                .ok_or(SubmissionError::AlreadySubmitting)?,
        ),
        None => None,
    };

    let image = match (session.identity(), payload.image.as_deref()) {
        (Some(_), Some(name)) if !name.trim().is_empty() => resolve_image(&state, name).await?,
        _ => ImageRef::None,
    };
    draft.image_url = image.url().to_owned();

    let navigation = Arc::new(NavigationLog::new());
    let action = SubmissionAction::new(state.products.clone(), navigation.clone());
    let outcome = action.submit(&session, &draft, image).await?;
    let redirect = navigation.last().unwrap_or(outcome.route()).path();

    match outcome {
        SubmissionOutcome::LoginRequired => Err(AppError::LoginRequired(redirect)),
        SubmissionOutcome::Created(stored) => Ok((
            StatusCode::CREATED,
            Json(CreateProductResponse {
                product: ProductResponse::from(stored),
                redirect,
            }),
        )),
    }
}

/// Turn an object name from a previous upload into a persistable image.
async fn resolve_image(state: &AppState, name: &str) -> Result<ImageRef, AppError> {
    let name = ObjectName::parse(name)
        .map_err(|e| AppError::Validation(format!("Invalid image name: {e}")))?;
    let resolver = BucketResolver::new(&*state.objects, &state.config.storage.bucket);

    match Uploaded::existing(name.clone()).resolve(&resolver).await {
        Ok(image) => Ok(ImageRef::Resolved(image)),
        Err(UploadError::Resolution(StorageError::NotFound(_))) => Err(AppError::Validation(
            format!("Image '{name}' has not been uploaded"),
        )),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products, newest first",
    responses(
        (status = 200, description = "All products", body = ProductListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductListResponse>, AppError> {
    let products: Vec<ProductResponse> = state
        .products
        .list()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ProductListResponse {
        total: products.len() as u64,
        products,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product by ID",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, AppError> {
    let stored = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse::from(stored)))
}
