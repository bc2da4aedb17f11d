mod photo_routes;

use axum::{
    Router,
    extract::Request,
    http::{Method, header},
    middleware,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::common::{AppState, guard_origin, metrics};

pub use photo_routes::photo_routes;

/// Full public router: the photo API plus read-only media files.
pub fn router(state: AppState) -> Router {
    let allow_origin = if state.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(state.allowed_origins.iter().cloned())
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);

    let media = ServeDir::new(&state.config.gallery_media_root);

    Router::new()
        .merge(photo_routes())
        .nest_service(&state.config.gallery_media_url, media)
        .route_layer(middleware::from_fn(metrics::track_http))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), guard_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        client_ip = %req
                            .headers()
                            .get("x-forwarded-for")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("unknown"),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::INFO)),
        )
        .with_state(state)
}
