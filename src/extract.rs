//! Request extractors shared by the route handlers.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::constants::SESSION_COOKIE_NAME;
use crate::error::AppError;
use crate::models::SessionRecord;
use crate::security::unsign_session_token;
use crate::AppState;

/// Request body accepted as either JSON or a urlencoded form
///
/// Malformed bodies are rejected with a 400 validation error rather than
/// axum's default 415/422.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
            Ok(Payload(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
            Ok(Payload(value))
        }
    }
}

/// The logged-in user behind the request's session cookie
///
/// Rejects with `NotLoggedIn` when the cookie is missing, its signature does
/// not verify, or the server-side session is unknown or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i64,
    /// Session token (unsigned), used by logout
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE_NAME).ok_or(AppError::NotLoggedIn)?;

        let token = match unsign_session_token(cookie.value(), &state.config.session_secret) {
            Some(token) => token.to_string(),
            None => {
                tracing::warn!("Rejected session cookie with invalid signature");
                return Err(AppError::NotLoggedIn);
            }
        };

        let session = SessionRecord::find_active(&state.db, &token, Utc::now().timestamp())
            .await?
            .ok_or(AppError::NotLoggedIn)?;

        Ok(CurrentUser {
            user_id: session.user_id,
            token,
        })
    }
}
