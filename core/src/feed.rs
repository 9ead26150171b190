use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};

use crate::models::LocationFix;
use crate::session::{Ingest, SessionController};

/// Hendelse fra sensorlaget (LocationManager/pedometer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    Fix(LocationFix),
    Steps(i64),
}

/// Begrenset kanal mellom sensor-callbacks og kontrolleren. Leveransetakten
/// kobles fra prosesseringen, og kontrolleren forblir eneste skriver.
pub struct SensorFeed {
    rx: Receiver<SensorEvent>,
}

impl SensorFeed {
    /// Opprett feed med gitt kapasitet. Senderen gis til sensorkilden;
    /// blokkerer ved full kø (backpressure mot callback-laget).
    pub fn bounded(capacity: usize) -> (SyncSender<SensorEvent>, SensorFeed) {
        let (tx, rx) = sync_channel(capacity);
        (tx, SensorFeed { rx })
    }

    /// Kjør til sendersiden lukkes. Returnerer antall aksepterte hendelser.
    /// Kjøres typisk på egen tråd.
    pub fn pump(self, controller: &SessionController) -> usize {
        let mut accepted = 0usize;
        for event in self.rx.iter() {
            if Self::dispatch(controller, event) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Tøm det som ligger klart uten å blokkere. Returnerer antall aksepterte.
    pub fn drain_pending(&self, controller: &SessionController) -> usize {
        let mut accepted = 0usize;
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if Self::dispatch(controller, event) {
                        accepted += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return accepted,
            }
        }
    }

    fn dispatch(controller: &SessionController, event: SensorEvent) -> bool {
        let outcome = match event {
            SensorEvent::Fix(fix) => controller.ingest_location(fix),
            SensorEvent::Steps(delta) => controller.ingest_steps(delta),
        };
        match outcome {
            Ok(Ingest::Accepted) => true,
            Ok(Ingest::Dropped(_)) => false,
            // Lukket økt: hendelser etter complete er bare etterslep
            Err(err) => {
                log::debug!("sensorhendelse mot lukket økt ignorert: {err}");
                false
            }
        }
    }
}
