//! ==============================================================================
//! simulator.rs - stand-in sensor node
//! ==============================================================================
//!
//! purpose:
//!     pushes synthetic readings to the hub the way the real ESP32 does,
//!     so the dashboard and API can be exercised without hardware on the
//!     desk. values drift randomly around plausible baselines; every few
//!     pushes the tag wanders out of range and the payload goes partial,
//!     which also exercises the hub's default coercion.
//!
//! usage:
//!     cargo run --bin simulator
//!     target and cadence come from [simulator] in config/hub.toml.
//!
//! ==============================================================================

use anyhow::Result;
use rand::Rng;
use serde_json::json;

use pet_hub::config::HubConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = HubConfig::load_or_default();
    let endpoint = format!("{}/api/sensor", config.simulator.hub_url.trim_end_matches('/'));
    let interval = std::time::Duration::from_secs(config.simulator.interval_seconds);

    println!("[SIM] Pushing to {} every {}s", endpoint, config.simulator.interval_seconds);

    let client = reqwest::Client::new();
    let mut rng = rand::thread_rng();
    let tags = ["ABC123", "DEF456", "GHI789"];

    let mut distance: f64 = 45.0;
    let mut temperature: f64 = 24.0;

    loop {
        distance = (distance + rng.gen_range(-5.0..5.0)).clamp(2.0, 200.0);
        temperature = (temperature + rng.gen_range(-0.5..0.5)).clamp(15.0, 35.0);

        // roughly one push in six arrives with no tag read
        let payload = if rng.gen_ratio(1, 6) {
            json!({ "distance": distance.round(), "temperature": temperature })
        } else {
            let tag = tags[rng.gen_range(0..tags.len())];
            json!({
                "distance": distance.round(),
                "temperature": temperature,
                "rfid": tag,
            })
        };

        match client.post(&endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                println!("[SIM] Sent {}", payload);
            }
            Ok(response) => {
                println!("[SIM] Hub answered {}", response.status());
            }
            Err(e) => {
                println!("[SIM] Push failed: {}", e);
            }
        }

        tokio::time::sleep(interval).await;
    }
}
