use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::metrics::{sync_attempt_total, sync_failure_total, walks_persisted_total, Metrics};
use crate::models::Walk;
use crate::session::{SessionController, SessionError};
use crate::store::WalkStore;

/// Aggregert resultat av én retry-runde. Per-tur-feil aborterer aldri
/// batchen, de telles her og vises som soft error i UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryReport {
    pub attempted: usize,
    pub persisted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Ran(RetryReport),
    /// En annen tråd kjører allerede retry; kallet er en no-op.
    AlreadyRunning,
}

/// Kø over fullførte turer som ikke er bekreftet lagret eksternt.
/// FIFO nøklet på tur-id; `retry_pending` er idempotent og trygt å kalle
/// ved hver app-foregrounding.
pub struct PendingSync {
    queue: Mutex<VecDeque<Walk>>,
    // Koalescerer samtidige retry-kall: nr. 2 får AlreadyRunning.
    run_lock: Mutex<()>,
    metrics: Arc<Metrics>,
}

impl PendingSync {
    pub fn new() -> Self {
        Self::with_metrics(crate::metrics::default_metrics())
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            run_lock: Mutex::new(()),
            metrics,
        }
    }

    /// Legg en fullført tur i køen. Duplikat-id er no-op (returnerer false),
    /// så dobbel oppkobling av complete-flyten ikke gir doble lagringer.
    pub fn enqueue(&self, walk: Walk) -> bool {
        let mut queue = self.queue.lock().unwrap();
        if queue.iter().any(|w| w.id() == walk.id()) {
            log::debug!("tur {} ligger allerede i pending-kø", walk.id());
            return false;
        }
        log::info!("tur {} lagt i pending-kø", walk.id());
        queue.push_back(walk);
        true
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.queue
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.id().to_string())
            .collect()
    }

    /// Snapshot av køen i rekkefølge, for disk-persist (`store::save_pending`).
    pub fn snapshot(&self) -> Vec<Walk> {
        self.queue.lock().unwrap().iter().cloned().collect()
    }

    /// Fyll køen fra et disk-snapshot. Duplikat-id-er hoppes over.
    pub fn restore(&self, walks: Vec<Walk>) {
        for walk in walks {
            self.enqueue(walk);
        }
    }

    /// Prøv å lagre alle ventende turer, eldst først. Suksess fjerner turen
    /// fra køen, feil lar den ligge til neste runde uten å blokkere de neste.
    /// Samtidige kall koalesceres via run-låsen.
    pub fn retry_pending(&self, store: &dyn WalkStore) -> RetryOutcome {
        let Ok(_guard) = self.run_lock.try_lock() else {
            log::debug!("retry pågår allerede, hopper over");
            return RetryOutcome::AlreadyRunning;
        };

        let batch = self.snapshot();
        let mut report = RetryReport::default();

        for walk in batch {
            report.attempted += 1;
            sync_attempt_total(&self.metrics).inc();
            match store.save(&walk) {
                Ok(()) => {
                    walks_persisted_total(&self.metrics).inc();
                    self.remove(walk.id());
                    report.persisted += 1;
                    log::info!("✅ tur {} lagret eksternt", walk.id());
                }
                Err(err) => {
                    sync_failure_total(&self.metrics).inc();
                    report.failed += 1;
                    log::warn!("tur {} feilet ved lagring: {err}", walk.id());
                }
            }
        }

        RetryOutcome::Ran(report)
    }

    fn remove(&self, id: &str) {
        let mut queue = self.queue.lock().unwrap();
        queue.retain(|w| w.id() != id);
    }
}

impl Default for PendingSync {
    fn default() -> Self {
        Self::new()
    }
}

/// Fullfør den aktive turen og forsøk umiddelbar lagring. Feiler lagringen,
/// havner turen i pending-køen – den regnes uansett som fullført lokalt,
/// UI skal aldri blokkeres av en synkfeil.
pub fn complete_and_persist(
    controller: &SessionController,
    store: &dyn WalkStore,
    pending: &PendingSync,
) -> Result<Walk, SessionError> {
    complete_and_persist_at(controller, store, pending, Utc::now())
}

pub fn complete_and_persist_at(
    controller: &SessionController,
    store: &dyn WalkStore,
    pending: &PendingSync,
    now: DateTime<Utc>,
) -> Result<Walk, SessionError> {
    let walk = controller.complete_at(now)?;
    let _ = controller.take_completed();
    sync_attempt_total(&pending.metrics).inc();
    match store.save(&walk) {
        Ok(()) => {
            walks_persisted_total(&pending.metrics).inc();
            log::info!("✅ tur {} lagret eksternt", walk.id());
        }
        Err(err) => {
            sync_failure_total(&pending.metrics).inc();
            log::warn!("umiddelbar lagring av {} feilet: {err}", walk.id());
            pending.enqueue(walk.clone());
        }
    }
    Ok(walk)
}
