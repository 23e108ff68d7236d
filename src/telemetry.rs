//! Telemetry logic.
//! Support tracing, metrics and logging.
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use metrics::{Unit, gauge};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use opentelemetry::trace::{Span, Tracer};
use opentelemetry::{KeyValue, global};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::AppState;
use crate::config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const REFRESH_PROCESS_INTERVAL: Duration = Duration::from_secs(10);
const EXPONENTIAL_SECONDS: &[f64] =
    &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

fn resource() -> Resource {
    Resource::builder()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .build()
}

/// Providers to flush on shutdown.
#[derive(Default)]
pub struct Guard {
    tracer: Option<SdkTracerProvider>,
    logger: Option<SdkLoggerProvider>,
}

impl Guard {
    /// Flush pending spans and logs.
    pub fn shutdown(self) {
        if let Some(Err(err)) = self.tracer.map(|t| t.shutdown()) {
            tracing::error!(error = %err, "failed to shutdown tracer");
        }
        if let Some(Err(err)) = self.logger.map(|l| l.shutdown()) {
            tracing::error!(error = %err, "failed to shutdown logger");
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stdout, filtered by `RUST_LOG` (default `info`). When an OTLP
/// endpoint is configured, spans and log events are exported as well.
pub fn init(config: &config::Telemetry) -> Result<Guard, BoxError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let mut guard = Guard::default();
    let bridge = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = setup_tracer(endpoint)?;
            global::set_tracer_provider(tracer.clone());
            guard.tracer = Some(tracer);

            let logger = setup_logger(endpoint)?;
            let bridge = OpenTelemetryTracingBridge::new(&logger);
            guard.logger = Some(logger);
            Some(bridge)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(bridge)
        .try_init()?;

    Ok(guard)
}

/// Create tracer for OTLP.
fn setup_tracer(endpoint: &str) -> Result<SdkTracerProvider, BoxError> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource())
        .build())
}

/// Create OTLP exporter for logs.
fn setup_logger(endpoint: &str) -> Result<SdkLoggerProvider, BoxError> {
    let exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(resource())
        .with_batch_exporter(exporter)
        .build())
}

/// Create recorder for Prometheus metrics.
///
/// Must be called once per process, from within the tokio runtime.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BoxError> {
    metrics::describe_counter!(
        "http_requests_total",
        "Handled HTTP requests by method, path and status."
    );
    metrics::describe_histogram!(
        "http_requests_duration_seconds",
        Unit::Seconds,
        "HTTP request latency."
    );
    metrics::describe_gauge!(
        "process_cpu_usage",
        Unit::Percent,
        "CPU usage of the process in percentage."
    );
    metrics::describe_gauge!(
        "process_memory_used_bytes",
        Unit::Bytes,
        "Total process memory in bytes."
    );

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_requests_duration_seconds".to_owned()),
            EXPONENTIAL_SECONDS,
        )?
        .install_recorder()?;

    tokio::spawn(refresh_process_gauges());

    Ok(handle)
}

async fn refresh_process_gauges() {
    let mut system = System::new_with_specifics(RefreshKind::nothing());
    let pid = Pid::from_u32(std::process::id());
    let mut interval = tokio::time::interval(REFRESH_PROCESS_INTERVAL);

    loop {
        interval.tick().await;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );

        if let Some(process) = system.process(pid) {
            gauge!("process_memory_used_bytes").set(process.memory() as f64);
            gauge!("process_cpu_usage").set(process.cpu_usage() as f64);
        }
    }
}

/// Render Prometheus metrics, when the recorder is installed.
pub async fn render_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::default()),
    }
}

/// Record request count, latency and an OTLP span per request.
pub async fn track(req: Request, next: Next) -> impl IntoResponse {
    let mut span = global::tracer("tracing-http").start("http-request");

    let start = Instant::now();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().to_string();
    let version = format!("{:?}", req.version());

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    span.set_attributes([
        KeyValue::new("version", version),
        KeyValue::new("path", path.clone()),
        KeyValue::new("method", method.clone()),
        KeyValue::new("status", status.clone()),
    ]);

    let labels = [("method", method), ("path", path), ("status", status)];
    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_requests_duration_seconds", &labels)
        .record(latency);

    span.end();

    response
}
