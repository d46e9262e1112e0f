//! Prometheus surface.
//!
//! Every scrape of `/metrics` builds a fresh registry, asks the exporter for
//! each of its gauges concurrently and encodes the result.  Nothing is kept
//! between scrapes; cheap repeated scrapes come from the document cache.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::future::join_all;
use prometheus::{Encoder, GaugeVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::scoreboard::{Exporter, MetricKind, Observation};

const LABELS: [&str; 2] = ["team", "service"];

#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<dyn Exporter>,
}

/// Build the Axum router for the metrics endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::new(state))
}

async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    format!(
        "adctf-scoreboard-exporter ({})\n\nMetrics are served at /metrics\n",
        state.exporter.name()
    )
}

/// GET /metrics
async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    render(state.exporter.as_ref())
        .await
        .map(|body| ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Run one collection pass and encode it in the text exposition format.
pub async fn render(exporter: &dyn Exporter) -> prometheus::Result<String> {
    let registry = collect(exporter).await?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Observe every gauge of `exporter` into a new registry.
///
/// A gauge whose observation fails is logged and left out of the registry
/// entirely; the remaining gauges are still exported.
pub async fn collect(exporter: &dyn Exporter) -> prometheus::Result<Registry> {
    let start = Instant::now();
    let registry = Registry::new();

    let passes = exporter
        .gauges()
        .iter()
        .map(|&kind| async move { (kind, exporter.observe(kind).await) });

    let mut failed = 0usize;
    for (kind, result) in join_all(passes).await {
        match result {
            Ok(observations) => register(&registry, kind, &observations)?,
            Err(e) => {
                failed += 1;
                warn!(
                    "{}: collecting {} failed: {}",
                    exporter.name(),
                    kind.metric_name(),
                    e
                );
            }
        }
    }

    debug!(
        "{}: collection pass done in {:?} ({} gauge(s) failed)",
        exporter.name(),
        start.elapsed(),
        failed
    );
    Ok(registry)
}

fn register(registry: &Registry, kind: MetricKind, observations: &[Observation]) -> prometheus::Result<()> {
    let opts = Opts::new(kind.metric_name(), kind.description());

    if !kind.is_faceted() {
        let gauge = IntGauge::with_opts(opts)?;
        if let Some(obs) = observations.last() {
            gauge.set(obs.value.as_i64());
        }
        return registry.register(Box::new(gauge));
    }

    if kind.is_integer() {
        let gauge = IntGaugeVec::new(opts, &LABELS)?;
        for obs in observations {
            if let Some(attrs) = &obs.attributes {
                gauge
                    .with_label_values(&[attrs.team.as_str(), attrs.service.as_str()])
                    .set(obs.value.as_i64());
            }
        }
        registry.register(Box::new(gauge))
    } else {
        let gauge = GaugeVec::new(opts, &LABELS)?;
        for obs in observations {
            if let Some(attrs) = &obs.attributes {
                gauge
                    .with_label_values(&[attrs.team.as_str(), attrs.service.as_str()])
                    .set(obs.value.as_f64());
            }
        }
        registry.register(Box::new(gauge))
    }
}
