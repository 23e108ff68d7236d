//! Rolodex is a small user record API over PostgreSQL.

#![forbid(unsafe_code)]
#![deny(unused_mut)]
pub mod config;
mod database;
pub mod error;
pub mod record;
mod router;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

pub use error::ServerError;
use record::{MemoryRecordStore, PgRecordStore, RecordService, RecordStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub records: RecordService,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /` lists every record, like `GET /users`.
        .route("/", get(router::users::list::handler))
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        // `GET /metrics` exposes Prometheus metrics.
        .route("/metrics", get(telemetry::render_metrics))
        .nest("/users", router::users::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
///
/// Connects to PostgreSQL when configured, otherwise records live in memory.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store: Arc<dyn RecordStore> = match config.postgres {
        Some(ref postgres) => {
            Arc::new(PgRecordStore::new(database::connect(postgres).await?))
        },
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, records are kept in memory"
            );
            Arc::new(MemoryRecordStore::new())
        },
    };

    let metrics = if config.telemetry.prometheus {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    Ok(AppState {
        config,
        records: RecordService::new(store),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::record::{Record, RecordFields};

    async fn list(app: &Router) -> Vec<Record> {
        let response =
            make_request(app.clone(), Method::GET, "/users", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    async fn create(app: &Router, fields: &RecordFields) -> i64 {
        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            json!(fields).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let app = app(router::state());
        let alice = RecordFields::new("Alice", "a@x.com", "pw1");
        let bob = RecordFields::new("Bob", "b@x.com", "pw2");

        let alice_id = create(&app, &alice).await;
        let bob_id = create(&app, &bob).await;
        assert_eq!((alice_id, bob_id), (1, 2));
        assert_eq!(
            list(&app).await,
            vec![
                alice.clone().into_record(alice_id),
                bob.clone().into_record(bob_id)
            ]
        );

        let alice2 = RecordFields::new("Alice2", "a2@x.com", "pw1b");
        let response = make_request(
            app.clone(),
            Method::PUT,
            &format!("/users/{alice_id}"),
            json!(alice2).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            list(&app).await,
            vec![
                alice2.clone().into_record(alice_id),
                bob.into_record(bob_id)
            ]
        );

        let response = make_request(
            app.clone(),
            Method::DELETE,
            &format!("/users/{bob_id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(list(&app).await, vec![alice2.into_record(alice_id)]);
    }

    #[tokio::test]
    async fn test_storage_failure_is_generic_500() {
        let app = app(router::failing_state());
        let fields = json!(RecordFields::new("Alice", "a@x.com", "pw1")).to_string();

        let requests = [
            (Method::GET, "/", String::default()),
            (Method::GET, "/users", String::default()),
            (Method::GET, "/users/1", String::default()),
            (Method::POST, "/users", fields.clone()),
            (Method::PUT, "/users/1", fields),
            (Method::DELETE, "/users/1", String::default()),
        ];

        for (method, path, body) in requests {
            let response = make_request(app.clone(), method, path, body).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: error::ResponseError = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.status, 500);
            assert_eq!(body.title, "Internal server error.");
            assert!(body.detail.is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(router::state());

        let response =
            make_request(app, Method::GET, "/profile", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
