use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Status for en gåtur. Lukket enum – lovlige overganger håndheves i
/// `session.rs`, ingen andre skal sjekke/endre status ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalkStatus {
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64, // grader
    pub lon: f64, // grader
}

/// Én GPS-fix fra sensorlaget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coord: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub accuracy_m: f64, // horisontal nøyaktighet (meter)
}

/// Én registrert gåtur med tids-, distanse- og skrittregnskap.
///
/// Feltene muteres kun av `SessionController` (pub(crate)); alle andre leser
/// via aksessorene. Det hindrer at tilstandsmaskinen omgås.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walk {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) start_time: Option<DateTime<Utc>>,
    pub(crate) end_time: Option<DateTime<Utc>>,
    pub(crate) total_distance_m: f64, // meter, aldri synkende
    pub(crate) total_steps: u64,
    pub(crate) locations: Vec<LocationFix>, // append-only, stigende timestamp
    pub(crate) status: WalkStatus,
    pub(crate) paused_at: Option<DateTime<Utc>>, // Some iff status == Paused
    pub(crate) total_paused_s: f64, // sekunder, aldri synkende
    pub(crate) created_at: DateTime<Utc>,
}

impl Walk {
    pub(crate) fn new(title: &str, description: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_walk_id(),
            title: title.to_string(),
            description: description.to_string(),
            start_time: None,
            end_time: None,
            total_distance_m: 0.0,
            total_steps: 0,
            locations: Vec::new(),
            status: WalkStatus::NotStarted,
            paused_at: None,
            total_paused_s: 0.0,
            created_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> WalkStatus {
        self.status
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn locations(&self) -> &[LocationFix] {
        &self.locations
    }

    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    pub fn total_paused_s(&self) -> f64 {
        self.total_paused_s
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Legg det åpne pauseintervallet inn i totalen og nullstill `paused_at`.
    /// No-op hvis turen ikke står i pause.
    pub(crate) fn fold_open_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            let secs = duration_secs(now, paused_at);
            if secs > 0.0 {
                self.total_paused_s += secs;
            }
        }
    }

    /// Medgått tid (sekunder) ved `now`: (end ?? now) - start - pauser.
    /// Et åpent pauseintervall telles også bort, slik at klokka står stille
    /// mens turen er pauset. Klampes til >= 0.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        let Some(start) = self.start_time else {
            return 0.0;
        };
        let end = self.end_time.unwrap_or(now);
        let mut paused = self.total_paused_s;
        if let Some(paused_at) = self.paused_at {
            paused += duration_secs(end, paused_at).max(0.0);
        }
        (duration_secs(end, start) - paused).max(0.0)
    }
}

fn duration_secs(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

// Samme mønster som session-id-ene i appen for øvrig: nanos + pid holder
// for lokal unikhet, backend gjør upsert på id.
fn generate_walk_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("walk-{nanos}-{}", std::process::id())
}
