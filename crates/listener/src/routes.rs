use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use interceptor::{Interceptor, Reply};

/// Largest event body accepted, matching GitHub's 25 MB webhook payload cap.
/// Anything bigger is treated as an unreadable body.
pub const MAX_EVENT_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    interceptor: Interceptor,
}

/// Builds the service routes around `interceptor`.
pub fn router(interceptor: Interceptor) -> Router {
    Router::new()
        .route("/health", any(health))
        .route("/", any(handle_event))
        .fallback(handle_event)
        .with_state(AppState { interceptor })
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handle_event(State(state): State<AppState>, body: Body) -> Response {
    let reply = match axum::body::to_bytes(body, MAX_EVENT_BYTES).await {
        Ok(bytes) => state.interceptor.respond(&bytes).await,
        Err(err) => state.interceptor.reject_unreadable(err.to_string()),
    };
    into_response(reply)
}

fn into_response(reply: Reply) -> Response {
    let status =
        StatusCode::from_u16(reply.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, Reply::CONTENT_TYPE)], reply.body).into_response()
}
