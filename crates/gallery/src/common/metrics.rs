use std::{
    future,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::IntoResponse,
    routing,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::db::Repository;

const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
const HTTP_REQUESTS_DURATION: &str = "http_requests_duration_seconds";
const GALLERY_PHOTOS_TOTAL: &str = "gallery_photos_total";

pub async fn track_http(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    metrics::histogram!(HTTP_REQUESTS_DURATION, &labels).record(latency);

    response
}

/// Installs the global Prometheus recorder and returns the `/metrics` router.
pub fn prometheus_router() -> Result<Router> {
    let recorder_handle = setup_metrics_recorder()?;
    Ok(Router::new().route(
        "/metrics",
        routing::get(move || future::ready(recorder_handle.render())),
    ))
}

fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUESTS_DURATION.to_string()),
            EXPONENTIAL_SECONDS,
        )?
        .install_recorder()?;
    Ok(handle)
}

/// Periodically publishes the number of stored photos.
pub fn spawn_gallery_metrics(repo: Arc<Repository>, refresh_secs: u64) {
    let period = Duration::from_secs(refresh_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(e) = record_photo_count(&repo).await {
                tracing::warn!("cannot count photos: {e:#}");
            }
        }
    });
}

pub async fn record_photo_count(repo: &Repository) -> Result<usize> {
    let n = repo.count_photos().await?;
    metrics::gauge!(GALLERY_PHOTOS_TOTAL).set(n as f64);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, middleware};
    use metrics_exporter_prometheus::PrometheusRecorder;
    use tower::ServiceExt;

    use super::*;
    use crate::db::NewPhoto;

    fn run_with_recorder<F: Future>(recorder: &PrometheusRecorder, fut: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        metrics::with_local_recorder(recorder, || rt.block_on(fut))
    }

    fn metric_line<'a>(rendered: &'a str, name: &str) -> Option<&'a str> {
        rendered
            .lines()
            .find(|l| l.starts_with(name) && !l.starts_with('#'))
    }

    #[test]
    fn requests_are_labelled_by_matched_path() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let app = Router::new()
            .route("/photos/{id}", routing::get(|| async { "ok" }))
            .route_layer(middleware::from_fn(track_http));

        let status = run_with_recorder(&recorder, async move {
            let req = axum::http::Request::get("/photos/42").body(Body::empty()).unwrap();
            app.oneshot(req).await.unwrap().status()
        });
        assert_eq!(status, StatusCode::OK);

        let rendered = handle.render();
        let line = metric_line(&rendered, "http_requests_total{").unwrap();
        assert!(line.contains(r#"method="GET""#), "{line}");
        assert!(line.contains(r#"path="/photos/{id}""#), "{line}");
        assert!(line.contains(r#"status="200""#), "{line}");
        assert!(line.ends_with(" 1"), "{line}");
        assert!(rendered.contains(HTTP_REQUESTS_DURATION));
    }

    #[test]
    fn photo_gauge_follows_the_store() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(&dir.path().join("db.sqlite3")).unwrap();

        let counted = run_with_recorder(&recorder, async {
            for i in 0..2 {
                repo.add_photo(NewPhoto {
                    title: format!("Photo {i}"),
                    description: "Shot.".to_string(),
                    image: format!("gallery/{i}.jpg"),
                })
                .await
                .unwrap();
            }
            record_photo_count(&repo).await.unwrap()
        });
        assert_eq!(counted, 2);

        let rendered = handle.render();
        let line = metric_line(&rendered, GALLERY_PHOTOS_TOTAL).unwrap();
        let value: f64 = line.rsplit(' ').next().unwrap().parse().unwrap();
        assert_eq!(value, 2.0);
    }
}
