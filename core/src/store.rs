use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use ureq::Agent;

use crate::models::Walk;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http-feil mot lager: {0}")]
    Http(String),
    #[error("kunne ikke dekode svar: {0}")]
    Decode(String),
    #[error("io-feil: {0}")]
    Io(#[from] std::io::Error),
    #[error("json-feil: {0}")]
    Json(#[from] serde_json::Error),
}

/// Eksternt lager for fullførte turer. Upsert nøklet på `walk.id` – samme
/// tur kan trygt lagres flere ganger (retry-stien avhenger av det).
pub trait WalkStore {
    fn save(&self, walk: &Walk) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Deserialize)]
struct SaveAck {
    ok: bool,
}

/// Blocking HTTP-lager (ureq). PUT /walks/{id} med turen som JSON-body.
pub struct RemoteStore {
    agent: Agent,
    base_url: String,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(10))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl WalkStore for RemoteStore {
    fn save(&self, walk: &Walk) -> Result<(), StoreError> {
        let url = format!("{}/walks/{}", self.base_url, walk.id());
        let body = serde_json::to_value(walk)?;
        let resp = self
            .agent
            .put(&url)
            .send_json(body)
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let text = resp.into_string()?;
        let mut de = serde_json::Deserializer::from_str(&text);
        // serde_path_to_error gir feltsti i feilmeldingen ved skjema-drift
        let ack: SaveAck = serde_path_to_error::deserialize(&mut de)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !ack.ok {
            return Err(StoreError::Http(format!("lager avviste {}", walk.id())));
        }
        Ok(())
    }
}

/// Skriver pending-køen til disk som JSON (pretty-print), slik at køen
/// overlever omstart av appen.
pub fn save_pending(path: &str, walks: &[Walk]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(walks)?;
    std::fs::write(path, json)?;
    log::info!("💾 pending-kø lagret til {path} ({} turer)", walks.len());
    Ok(())
}

/// Leser pending-køen fra disk. Mangler filen, returneres tom kø.
pub fn load_pending(path: &str) -> Result<Vec<Walk>, StoreError> {
    if !Path::new(path).exists() {
        log::info!("fant ikke pending-kø på {path}, starter tom");
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let mut de = serde_json::Deserializer::from_str(&contents);
    let walks: Vec<Walk> = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    log::info!("📂 pending-kø lastet fra {path} ({} turer)", walks.len());
    Ok(walks)
}
