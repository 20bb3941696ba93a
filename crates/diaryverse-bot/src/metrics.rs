use prometheus::{Encoder, TextEncoder, Registry, IntCounterVec, IntGauge, HistogramVec};
use lazy_static::lazy_static;
use std::sync::{Mutex, OnceLock};
use axum::response::IntoResponse;
use axum::http::StatusCode;
use tracing::warn;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static REPLY_SOURCE: OnceLock<IntCounterVec> = OnceLock::new();
static TRACKED_CONVERSATIONS: OnceLock<IntGauge> = OnceLock::new();
static INFERENCE_LATENCY: OnceLock<HistogramVec> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

pub fn init_metrics() -> prometheus::Result<()> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REQ_COUNTER.get().is_some() {
        return Ok(());
    }

    let req_counter = IntCounterVec::new(
        prometheus::opts!("requests_total", "Total requests per route"),
        &["route", "status"],
    )?;
    let reply_source = IntCounterVec::new(
        prometheus::opts!("chat_replies_total", "Chat replies by source"),
        &["source"],
    )?;
    let tracked = IntGauge::new("tracked_conversations", "Users with stored conversation history")?;
    let latency = HistogramVec::new(
        prometheus::HistogramOpts::new("inference_duration_seconds", "Time spent waiting on model backends"),
        &["task"],
    )?;

    REGISTRY.register(Box::new(req_counter.clone()))?;
    REGISTRY.register(Box::new(reply_source.clone()))?;
    REGISTRY.register(Box::new(tracked.clone()))?;
    REGISTRY.register(Box::new(latency.clone()))?;

    let _ = REQ_COUNTER.set(req_counter);
    let _ = REPLY_SOURCE.set(reply_source);
    let _ = TRACKED_CONVERSATIONS.set(tracked);
    let _ = INFERENCE_LATENCY.set(latency);
    Ok(())
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn inc_reply_source(source: &str) {
    if let Some(counter) = REPLY_SOURCE.get() {
        counter.with_label_values(&[source]).inc();
    }
}

pub fn set_tracked_conversations(count: usize) {
    if let Some(gauge) = TRACKED_CONVERSATIONS.get() {
        gauge.set(count as i64);
    }
}

pub fn observe_inference(task: &str, seconds: f64) {
    if let Some(histogram) = INFERENCE_LATENCY.get() {
        histogram.with_label_values(&[task]).observe(seconds);
    }
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
