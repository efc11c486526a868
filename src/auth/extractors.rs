use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::repo_types::User;
use crate::auth::token;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the authenticated user from the `Authorization` header.
///
/// Decodes the bearer token and resolves the embedded user id against the
/// users table on every request, so a token for a deleted account stops
/// working immediately.
#[derive(Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("No token provided".into()))?;

        // Expect "Bearer <token>"; anything else falls through to the codec,
        // which rejects it as a format error.
        let token = auth.strip_prefix("Bearer ").unwrap_or(auth);

        let user_id = token::decode(token).map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

        Ok(CurrentUser(user))
    }
}
