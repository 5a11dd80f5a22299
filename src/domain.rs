use serde::{Deserialize, Serialize};

/// connection status derived from ingestion activity
///
/// `waiting` only before the first reading arrives. once any reading has
/// been ingested the hub reports `connected` and never reverts (there is
/// no heartbeat or staleness tracking).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Waiting,
    Connected,
}

/// one normalized sensor sample
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reading {
    /// server-assigned capture time, unix millis
    pub timestamp: u64,

    /// human-readable local capture time (what the dashboard shows)
    #[serde(rename = "lastUpdate")]
    pub last_update: String,

    /// distance in centimeters (0 when the device sent nothing usable)
    pub distance: f64,

    /// temperature in celsius (0 when the device sent nothing usable)
    pub temperature: f64,

    /// RFID tag identifier ("none" when absent)
    pub rfid: String,

    pub status: ConnectionStatus,
}

/// the single most recent reading, plus the pre-ingestion placeholder
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LatestState {
    /// null until the first reading arrives
    #[serde(rename = "lastUpdate")]
    pub last_update: Option<String>,
    pub distance: f64,
    pub temperature: f64,
    pub rfid: String,
    pub status: ConnectionStatus,
}

impl Default for LatestState {
    fn default() -> Self {
        Self {
            last_update: None,
            distance: 0.0,
            temperature: 0.0,
            rfid: "none".to_string(),
            status: ConnectionStatus::Waiting,
        }
    }
}

impl LatestState {
    /// the latest record is always a whole-reading overwrite
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            last_update: Some(reading.last_update.clone()),
            distance: reading.distance,
            temperature: reading.temperature,
            rfid: reading.rfid.clone(),
            status: reading.status,
        }
    }
}

/// acknowledgement returned to the device after every accepted post
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestAck {
    pub success: bool,
    pub message: String,
    /// server ingestion time, unix millis
    pub timestamp: u64,
}
