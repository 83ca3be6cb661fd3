/// Metrics Module - Prometheus Instrumentation
///
/// Lookup outcomes, error kinds and explorer fetch latency. Registered once
/// into a crate-local registry and exposed at `/metrics`.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use lazy_static::lazy_static;
use once_cell::sync::OnceCell;

/// Standard latency buckets for histograms (seconds)
const LATENCY_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Address lookups by source and outcome
    /// Labels: source (bch, btc), outcome (ok, error)
    pub static ref LOOKUPS: IntCounterVec = IntCounterVec::new(
        Opts::new("addrbal_lookups_total", "Address statistic lookups by source and outcome"),
        &["source", "outcome"]
    ).unwrap();

    /// Failed lookups by error kind
    /// Labels: kind (decode, source, unsupported_source)
    pub static ref LOOKUP_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("addrbal_lookup_errors_total", "Failed lookups by error kind"),
        &["kind"]
    ).unwrap();

    /// Explorer retrieval latency
    /// Labels: source, stage (utxo_listing, transaction_detail)
    pub static ref EXPLORER_FETCH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("addrbal_explorer_fetch_duration_seconds", "Explorer retrieval latency")
            .buckets(LATENCY_BUCKETS.to_vec()),
        &["source", "stage"]
    ).unwrap();

    /// End-to-end lookup latency
    /// Labels: source
    pub static ref LOOKUP_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("addrbal_lookup_duration_seconds", "End-to-end lookup latency")
            .buckets(LATENCY_BUCKETS.to_vec()),
        &["source"]
    ).unwrap();
}

static INIT: OnceCell<()> = OnceCell::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    INIT.get_or_try_init(|| {
        REGISTRY.register(Box::new(LOOKUPS.clone()))?;
        REGISTRY.register(Box::new(LOOKUP_ERRORS.clone()))?;
        REGISTRY.register(Box::new(EXPLORER_FETCH_DURATION.clone()))?;
        REGISTRY.register(Box::new(LOOKUP_DURATION.clone()))?;
        Ok(())
    })
    .map(|_| ())
}

/// Gather metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

pub fn increment_lookups(source: &str, outcome: &str) {
    LOOKUPS.with_label_values(&[source, outcome]).inc();
}

pub fn increment_lookup_errors(kind: &str) {
    LOOKUP_ERRORS.with_label_values(&[kind]).inc();
}

pub fn record_fetch_duration(source: &str, stage: &str, duration_secs: f64) {
    EXPLORER_FETCH_DURATION
        .with_label_values(&[source, stage])
        .observe(duration_secs);
}

pub fn record_lookup_duration(source: &str, duration_secs: f64) {
    LOOKUP_DURATION.with_label_values(&[source]).observe(duration_secs);
}
