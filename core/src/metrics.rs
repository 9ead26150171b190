use once_cell::sync::Lazy;
use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Tellere for inntak og synk. Ett sett per app-instans; `default_metrics`
/// gir et delt sett for kall som ikke injiserer sitt eget.
pub struct Metrics {
    pub registry: Registry,
    ingest_rejected: IntCounter,
    ingest_dropped: IntCounter,
    sync_attempt: IntCounter,
    sync_failure: IntCounter,
    walks_persisted: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let ingest_rejected = register(
            &registry,
            "walk_ingest_rejected_total",
            "Avviste sensorhendelser (fix ute av rekkefølge, negativt skritt-delta)",
        );
        let ingest_dropped = register(
            &registry,
            "walk_ingest_dropped_total",
            "Sensorhendelser droppet utenfor InProgress",
        );
        let sync_attempt = register(
            &registry,
            "walk_sync_attempt_total",
            "Lagringsforsøk mot eksternt lager",
        );
        let sync_failure = register(
            &registry,
            "walk_sync_failure_total",
            "Feilede lagringsforsøk",
        );
        let walks_persisted = register(
            &registry,
            "walks_persisted_total",
            "Turer bekreftet lagret eksternt",
        );
        Self {
            registry,
            ingest_rejected,
            ingest_dropped,
            sync_attempt,
            sync_failure,
            walks_persisted,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn register(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("gyldig teller-navn");
    registry
        .register(Box::new(counter.clone()))
        .expect("teller registrert én gang");
    counter
}

pub fn ingest_rejected_total(m: &Metrics) -> &IntCounter {
    &m.ingest_rejected
}

pub fn ingest_dropped_total(m: &Metrics) -> &IntCounter {
    &m.ingest_dropped
}

pub fn sync_attempt_total(m: &Metrics) -> &IntCounter {
    &m.sync_attempt
}

pub fn sync_failure_total(m: &Metrics) -> &IntCounter {
    &m.sync_failure
}

pub fn walks_persisted_total(m: &Metrics) -> &IntCounter {
    &m.walks_persisted
}

static DEFAULT: Lazy<Arc<Metrics>> = Lazy::new(|| Arc::new(Metrics::new()));

pub fn default_metrics() -> Arc<Metrics> {
    Arc::clone(&DEFAULT)
}
