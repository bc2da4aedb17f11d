use axum::{Json, Router, extract::State, routing};

use crate::{
    common::{ApiResult, AppState},
    db::PhotoDto,
};

pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/api/photos", routing::get(list_photos))
        .route("/api/photos/", routing::get(list_photos))
}

async fn list_photos(State(state): State<AppState>) -> ApiResult<Json<Vec<PhotoDto>>> {
    let photos = state.repo.list_photos().await?;
    tracing::debug!(count = photos.len(), "listing photos");
    Ok(Json(photos.into_iter().map(PhotoDto::from).collect()))
}
