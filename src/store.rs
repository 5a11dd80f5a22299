//! ==============================================================================
//! store.rs - in-memory telemetry store
//! ==============================================================================
//!
//! purpose:
//!     owns the two pieces of shared mutable state in the whole hub:
//!     - the latest-reading record (what /api/data returns)
//!     - the bounded trailing history (what /api/history returns)
//!
//! consistency contract:
//!     `ingest` replaces the latest record AND appends to the history as one
//!     unit. callers hold a single write lock around the call (see server.rs),
//!     so the latest record always matches the newest history entry. readers
//!     take the read lock and clone a consistent snapshot.
//!
//! coercion policy:
//!     the sender is an unauthenticated embedded device that cannot act on
//!     validation feedback, so malformed field values are never rejected.
//!     `normalize_payload` maps anything that is not a JSON number to 0 and
//!     anything that is not a JSON string to "none". the only hard failure
//!     is a body that does not parse as JSON at all, and that is handled
//!     before this module is reached.
//!
//! relationships:
//!     - used by: server.rs (handlers), main.rs (state construction)
//!     - uses: domain.rs (Reading, LatestState, ConnectionStatus)
//!
//! ==============================================================================

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Local;
use serde_json::Value;

use crate::domain::{ConnectionStatus, LatestState, Reading};

/// trailing history cap. oldest entries are evicted first once full.
pub const HISTORY_CAPACITY: usize = 50;

/// all hub state. constructed once at startup, torn down at shutdown,
/// never persisted.
pub struct TelemetryStore {
    latest: LatestState,
    /// oldest-first; push_back + pop_front keeps append-and-evict O(1)
    history: VecDeque<Reading>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self {
            latest: LatestState::default(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// record one inbound payload: normalize it, stamp it with the server
    /// clock, replace the latest record, append to history, evict the
    /// oldest entry if the cap is exceeded. returns the stored reading.
    pub fn ingest(&mut self, payload: &Value) -> Reading {
        let reading = normalize_payload(payload, unix_millis());

        self.latest = LatestState::from_reading(&reading);
        self.history.push_back(reading.clone());
        if self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        reading
    }

    /// the most recent reading, or the waiting placeholder before any
    /// ingestion has happened
    pub fn latest(&self) -> LatestState {
        self.latest.clone()
    }

    /// full trailing history, oldest-first, at most `HISTORY_CAPACITY` long
    pub fn history(&self) -> Vec<Reading> {
        self.history.iter().cloned().collect()
    }
}

/// the one place the lenient-coercion policy lives.
///
/// `distance` / `temperature` are taken only when the device sent a JSON
/// number; everything else (missing field, string, bool, null, non-object
/// body) becomes 0. `rfid` is taken only when a JSON string, else "none".
pub fn normalize_payload(payload: &Value, timestamp: u64) -> Reading {
    Reading {
        timestamp,
        last_update: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        distance: payload
            .get("distance")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        temperature: payload
            .get("temperature")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        rfid: payload
            .get("rfid")
            .and_then(Value::as_str)
            .unwrap_or("none")
            .to_string(),
        status: ConnectionStatus::Connected,
    }
}

/// current unix time in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
