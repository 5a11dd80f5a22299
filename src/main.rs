//! ==============================================================================
//! main.rs - pet-hub entry point
//! ==============================================================================
//!
//! purpose:
//!     in-memory telemetry hub for an ESP32 pet monitor. the device pushes
//!     readings (distance, temperature, RFID tag) over HTTP; the hub keeps
//!     the most recent reading plus the last 50 and serves both to any
//!     polling viewer.
//!
//! responsibilities:
//!     - load configuration (config/hub.toml, PORT env override)
//!     - construct the shared telemetry store
//!     - serve the sensor API and the dashboard
//!
//! architecture:
//!
//!     ┌──────────────────────────────────────────────────┐
//!     │                  pet-hub (this crate)            │
//!     │   ┌──────────────┐        ┌───────────────────┐  │
//!     │   │  web server  │        │  TelemetryStore   │  │
//!     │   │  (axum)      │◄──────►│  Arc<RwLock<..>>  │  │
//!     │   └──────┬───────┘        └───────────────────┘  │
//!     └──────────┼───────────────────────────────────────┘
//!                │ http
//!       ┌────────┴────────┐
//!       ▼                 ▼
//!     ESP32 device     browser dashboard
//!     (POST /api/sensor) (GET /, /api/data, /api/history)
//!
//! all state is volatile: the store is created at startup and discarded at
//! shutdown. durability, authentication, and multi-device tracking are out
//! of scope.
//!
//! ==============================================================================

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use pet_hub::config;
use pet_hub::server::{self, HubState};
use pet_hub::store::TelemetryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // startup banner
    println!("===========================================================");
    println!("  ESP32 Pet Monitor Hub");
    println!("===========================================================");

    // step 1: load configuration
    let config = config::HubConfig::load_or_default();
    config.print_summary();

    // step 2: initialize shared state
    let state = HubState {
        store: Arc::new(RwLock::new(TelemetryStore::new())),
        show_readings: config.logging.show_readings,
    };

    // step 3: serve
    println!("[STARTUP] Dashboard live at http://{}", config.listen_addr());
    println!("[STARTUP] Device endpoint: POST http://{}/api/sensor", config.listen_addr());
    println!("[STARTUP] Waiting for device to send data...");

    if let Err(e) = server::run_server(&config, state).await {
        eprintln!("[ERROR] Web server error: {}", e);
        return Err(e);
    }

    Ok(())
}
