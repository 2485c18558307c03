use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::{
    ERR_EMAIL_REQUIRED, ERR_NAME_REQUIRED, ERR_PASSWORD_REQUIRED, SESSION_COOKIE_NAME,
};
use crate::error::{AppError, Result};
use crate::extract::{CurrentUser, Payload};
use crate::models::{PublicUser, SessionRecord, User};
use crate::routes::validation::require_text;
use crate::security::{
    generate_session_token, hash_password, sign_session_token, unsign_session_token,
    verify_password,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Register a new user
///
/// POST /new_user with `email`, `name` and `password`.
/// The password is stored as an Argon2id hash. A duplicate email is rejected
/// with 400 "Email already exists".
pub async fn register_user(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> Result<Json<MessageResponse>> {
    let email = require_text(payload.email, ERR_EMAIL_REQUIRED)?;
    let name = require_text(payload.name, ERR_NAME_REQUIRED)?;
    let password = require_text(payload.password, ERR_PASSWORD_REQUIRED)?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let user_id = User::create(&state.db, &email, &name, &password_hash)
        .await
        .inspect_err(|e| {
            if matches!(e, AppError::EmailTaken) {
                tracing::info!("Registration with existing email rejected");
            }
        })?;

    tracing::info!("New user registered: {}", user_id);

    Ok(Json(MessageResponse {
        message: "User added",
    }))
}

/// Log in with email and password
///
/// POST /login. On success a new server-side session is created and bound to
/// a signed, httpOnly cookie. Any session the client held before is dropped.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Payload(payload): Payload<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let email = require_text(payload.email, ERR_EMAIL_REQUIRED)?;
    let password = require_text(payload.password, ERR_PASSWORD_REQUIRED)?;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let stored_hash = user.password_hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??;
    if !matches {
        tracing::warn!("Wrong password for user {}", user.id);
        return Err(AppError::WrongPassword);
    }

    // Drop the previous session, if the client still carries one
    if let Some(previous) = jar.get(SESSION_COOKIE_NAME) {
        if let Some(token) = unsign_session_token(previous.value(), &state.config.session_secret)
        {
            SessionRecord::delete(&state.db, token).await?;
        }
    }

    let now = Utc::now().timestamp();
    let session = SessionRecord::new(
        generate_session_token(),
        user.id,
        now,
        state.config.session_ttl_secs,
    );
    session.insert(&state.db, now).await?;

    let value = sign_session_token(&session.token, &state.config.session_secret)?;
    let jar = jar.add(session_cookie(value, &state.config));

    tracing::info!("User {} logged in", user.id);

    Ok((jar, Json(MessageResponse { message: "Logged in" })))
}

/// End the current session
///
/// POST /logout. Deletes the server-side session and expires the cookie.
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    SessionRecord::delete(&state.db, &user.token).await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));

    tracing::info!("User {} logged out", user.user_id);

    Ok((jar, Json(MessageResponse { message: "Logged out" })))
}

/// Current user's public profile
///
/// GET /user. Returns `{id, email, name}`, never the password hash.
pub async fn current_user(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PublicUser>> {
    // A session can outlive its user row, treat that as logged out
    let record = User::find_by_id(&state.db, user.user_id)
        .await?
        .ok_or(AppError::NotLoggedIn)?;

    Ok(Json(record.into()))
}

fn session_cookie(value: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(config.session_ttl_secs))
        .build()
}
