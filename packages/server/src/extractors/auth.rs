use axum::{extract::FromRequestParts, http::request::Parts};
use common::Identity;
use listing::{AuthSession, Route};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. A missing
/// token is answered with a redirect hint to the login route.
pub struct AuthUser {
    pub uid: String,
    pub display_name: String,
}

impl From<AuthUser> for Identity {
    fn from(user: AuthUser) -> Self {
        Identity {
            uid: user.uid,
            display_name: user.display_name,
        }
    }
}

/// Like [`AuthUser`], but a missing token yields an anonymous session.
///
/// A token that is present but invalid is still rejected.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn into_session(self) -> AuthSession {
        AuthSession::from(self.0.map(Identity::from))
    }
}

fn bearer_user(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::TokenInvalid)?;

    let claims =
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

    Ok(Some(AuthUser {
        uid: claims.sub,
        display_name: claims.name,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(parts, state)?.ok_or(AppError::LoginRequired(Route::Login.path()))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(bearer_user(parts, state)?))
    }
}
