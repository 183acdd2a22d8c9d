use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejections are reported as [`AppError`]s.
///
/// A missing `Content-Type: application/json` is a 415; anything the
/// deserializer rejects is a 400 with serde's message.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(AppError::UnsupportedMediaType(
                "Expected `Content-Type: application/json`".into(),
            )),
            Err(e) => {
                tracing::debug!(error = %e.body_text(), "Rejected JSON body");
                Err(AppError::Validation(e.body_text()))
            }
        }
    }
}
