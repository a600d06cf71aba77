use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static CHAT_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static DOCUMENT_UPLOADS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

pub fn init_metrics() {
    let registry = Registry::new();

    let chat_requests = IntCounterVec::new(
        Opts::new("chat_requests_total", "Chat turns sent to the backend"),
        &["outcome"],
    )
    .expect("metric can be created");

    let document_uploads = IntCounterVec::new(
        Opts::new(
            "document_uploads_total",
            "Document uploads submitted to the backend",
        ),
        &["outcome"],
    )
    .expect("metric can be created");

    registry
        .register(Box::new(chat_requests.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(document_uploads.clone()))
        .expect("collector can be registered");

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = CHAT_REQUESTS_TOTAL.set(chat_requests);
    let _ = DOCUMENT_UPLOADS_TOTAL.set(document_uploads);
}

pub fn record_chat(outcome: &str) {
    if let Some(counter) = CHAT_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn record_upload(outcome: &str) {
    if let Some(counter) = DOCUMENT_UPLOADS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn get_metrics() -> String {
    let registry = match REGISTRY.get() {
        Some(registry) => registry,
        None => return String::new(),
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
