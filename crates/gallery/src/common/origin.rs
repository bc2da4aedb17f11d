use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{ApiError, AppState};

/// Turns away cross-origin requests whose `Origin` is not on the allow-list.
/// Requests without an `Origin` header pass through untouched.
pub async fn guard_origin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        if !state.is_origin_allowed(origin) {
            tracing::warn!(origin = ?origin, "rejected cross-origin request");
            return ApiError::Forbidden.into_response();
        }
    }

    next.run(req).await
}
