use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::routes::{
    create_note, current_user, get_note, health_check, list_notes, login, logout, register_user,
    update_note, welcome,
};
use crate::AppState;

/// Build the application router with CORS and optional request tracing
///
/// Origins that are not valid header values are skipped with a warning.
pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentialed CORS: explicit origins and headers, never wildcards
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let log_requests = state.config.log_requests;

    let app = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .route("/new_user", post(register_user))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
        .route("/notes", get(list_notes))
        .route("/note", post(get_note))
        .route("/new_note", post(create_note))
        .route("/update_note", post(update_note))
        .layer(cors)
        .with_state(state);

    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}
