use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::geo::haversine_m;
use crate::metrics::{ingest_dropped_total, ingest_rejected_total, Metrics};
use crate::models::{LocationFix, Walk, WalkStatus};

/// Feil fra livssyklus-kall. `InvalidState` og `Closed` går synkront tilbake
/// til kalleren (UI-handler) – sensorstøy rapporteres aldri som feil.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("ugyldig overgang: {action} fra {from:?}")]
    InvalidState {
        from: WalkStatus,
        action: &'static str,
    },
    #[error("turen er fullført og lukket")]
    Closed,
    #[error("en tur er allerede aktiv")]
    AlreadyActive,
    #[error("ingen aktiv tur")]
    NoActiveWalk,
}

/// Utfall av ett inntak. Droppede hendelser er forventet (GPS-støy, pause),
/// derfor Ok-verdi og ikke feil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    Accepted,
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Ingen tur i InProgress – hendelsen teller ikke mot noen økt.
    NotTracking,
    /// Fix med timestamp før siste registrerte fix.
    OutOfOrder,
    /// Negativt skritt-delta (sensor-reset).
    NegativeDelta,
}

struct Inner {
    current: Option<Walk>,
}

/// Kontrolleren eier den aktive turen og er eneste skriver av feltene dens.
/// Alle muterende kall serialiseres gjennom én lås; lesere får klonede
/// snapshots tatt under samme lås. Én instans per app, eksplisitt eid og
/// injisert – ingen global singleton.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Mutex<Inner>>,
    metrics: Arc<Metrics>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::with_metrics(crate::metrics::default_metrics())
    }

    pub fn with_metrics(metrics: Arc<Metrics>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { current: None })),
            metrics,
        }
    }

    /// Opprett ny tur i NotStarted. Feiler hvis en tur allerede spores.
    pub fn begin(&self, title: &str, description: &str) -> Result<String, SessionError> {
        self.begin_at(title, description, Utc::now())
    }

    pub fn begin_at(
        &self,
        title: &str,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.current.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        let walk = Walk::new(title, description, now);
        let id = walk.id.clone();
        log::info!("ny tur opprettet: {id}");
        inner.current = Some(walk);
        Ok(id)
    }

    pub fn start(&self) -> Result<(), SessionError> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        match walk.status {
            WalkStatus::NotStarted => {
                walk.start_time = Some(now);
                walk.status = WalkStatus::InProgress;
                log::info!("tur startet: {}", walk.id);
                Ok(())
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            from => Err(SessionError::InvalidState {
                from,
                action: "start",
            }),
        }
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        match walk.status {
            WalkStatus::InProgress => {
                walk.paused_at = Some(now);
                walk.status = WalkStatus::Paused;
                log::info!("tur pauset: {}", walk.id);
                Ok(())
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            from => Err(SessionError::InvalidState {
                from,
                action: "pause",
            }),
        }
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        self.resume_at(Utc::now())
    }

    pub fn resume_at(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        match walk.status {
            WalkStatus::Paused => {
                walk.fold_open_pause(now);
                walk.status = WalkStatus::InProgress;
                log::info!("tur gjenopptatt: {}", walk.id);
                Ok(())
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            from => Err(SessionError::InvalidState {
                from,
                action: "resume",
            }),
        }
    }

    /// Fullfør turen. Fra Paused foldes det åpne pauseintervallet inn først,
    /// uten å innom InProgress. Returnerer den fullførte turen som verdi;
    /// turen blir stående som current (lukket) til `take_completed`/`discard`.
    pub fn complete(&self) -> Result<Walk, SessionError> {
        self.complete_at(Utc::now())
    }

    pub fn complete_at(&self, now: DateTime<Utc>) -> Result<Walk, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        match walk.status {
            WalkStatus::InProgress | WalkStatus::Paused => {
                walk.fold_open_pause(now);
                walk.end_time = Some(now);
                walk.status = WalkStatus::Completed;
                log::info!(
                    "tur fullført: {} ({:.0} m, {} skritt)",
                    walk.id,
                    walk.total_distance_m,
                    walk.total_steps
                );
                Ok(walk.clone())
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            from => Err(SessionError::InvalidState {
                from,
                action: "complete",
            }),
        }
    }

    /// Ta ut en fullført tur og fjern den fra aktiv sporing.
    /// None hvis ingen tur er fullført.
    pub fn take_completed(&self) -> Option<Walk> {
        let mut inner = self.inner.lock().unwrap();
        match inner.current.as_ref() {
            Some(walk) if walk.status == WalkStatus::Completed => inner.current.take(),
            _ => None,
        }
    }

    /// Forkast den aktive turen uansett tilstand.
    pub fn discard(&self) -> Option<Walk> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.take();
        if let Some(w) = &walk {
            log::info!("tur forkastet: {}", w.id);
        }
        walk
    }

    /// Ta imot én GPS-fix. Teller kun mens turen er InProgress; fixes med
    /// timestamp før forrige droppes (GPS-strømmer er støyete, det er ikke
    /// en feil). Distansen øker med haversine mot forrige fix.
    pub fn ingest_location(&self, fix: LocationFix) -> Result<Ingest, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(walk) = inner.current.as_mut() else {
            return Ok(self.dropped(DropReason::NotTracking));
        };
        match walk.status {
            WalkStatus::InProgress => {
                if let Some(last) = walk.locations.last() {
                    if fix.timestamp < last.timestamp {
                        ingest_rejected_total(&self.metrics).inc();
                        log::warn!("fix ute av rekkefølge droppet ({})", walk.id);
                        return Ok(Ingest::Dropped(DropReason::OutOfOrder));
                    }
                    walk.total_distance_m += haversine_m(last.coord, fix.coord);
                }
                walk.locations.push(fix);
                Ok(Ingest::Accepted)
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            WalkStatus::NotStarted | WalkStatus::Paused => {
                Ok(self.dropped(DropReason::NotTracking))
            }
        }
    }

    /// Ta imot et skritt-delta. Negative deltaer (sensor-reset) avvises og
    /// logges, de propageres aldri som feil.
    pub fn ingest_steps(&self, delta: i64) -> Result<Ingest, SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(walk) = inner.current.as_mut() else {
            return Ok(self.dropped(DropReason::NotTracking));
        };
        match walk.status {
            WalkStatus::InProgress => {
                if delta < 0 {
                    ingest_rejected_total(&self.metrics).inc();
                    log::warn!("negativt skritt-delta {delta} avvist ({})", walk.id);
                    return Ok(Ingest::Dropped(DropReason::NegativeDelta));
                }
                walk.total_steps += delta as u64;
                Ok(Ingest::Accepted)
            }
            WalkStatus::Completed => Err(SessionError::Closed),
            WalkStatus::NotStarted | WalkStatus::Paused => {
                Ok(self.dropped(DropReason::NotTracking))
            }
        }
    }

    pub fn set_title(&self, title: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        if walk.status == WalkStatus::Completed {
            return Err(SessionError::Closed);
        }
        walk.title = title.to_string();
        Ok(())
    }

    pub fn set_description(&self, description: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        let walk = inner.current.as_mut().ok_or(SessionError::NoActiveWalk)?;
        if walk.status == WalkStatus::Completed {
            return Err(SessionError::Closed);
        }
        walk.description = description.to_string();
        Ok(())
    }

    /// Status for den aktive turen, None hvis ingen.
    pub fn status(&self) -> Option<WalkStatus> {
        self.inner.lock().unwrap().current.as_ref().map(|w| w.status)
    }

    /// Konsistent snapshot av den aktive turen (klone tatt under låsen).
    pub fn snapshot(&self) -> Option<Walk> {
        self.inner.lock().unwrap().current.clone()
    }

    pub fn elapsed_s(&self) -> Option<f64> {
        self.elapsed_at(Utc::now())
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Option<f64> {
        self.inner
            .lock()
            .unwrap()
            .current
            .as_ref()
            .map(|w| w.elapsed_at(now))
    }

    /// Formatert distanse for UI, f.eks. "850 m" eller "1.25 km".
    pub fn distance_string(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .current
            .as_ref()
            .map(|w| crate::format::distance_string(w.total_distance_m))
    }

    /// Formatert medgått tid for UI, f.eks. "12:34".
    pub fn elapsed_string(&self) -> Option<String> {
        self.elapsed_at(Utc::now())
            .map(crate::format::elapsed_string)
    }

    fn dropped(&self, reason: DropReason) -> Ingest {
        ingest_dropped_total(&self.metrics).inc();
        log::debug!("sensorhendelse droppet: {reason:?}");
        Ingest::Dropped(reason)
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
