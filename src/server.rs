//! ==============================================================================
//! server.rs - HTTP surface
//! ==============================================================================
//!
//! purpose:
//!     exposes the telemetry store over HTTP:
//!     - POST /api/sensor   device pushes a reading (lenient JSON body)
//!     - GET  /api/data     latest reading (or the waiting placeholder)
//!     - GET  /api/history  trailing history, oldest-first, max 50 entries
//!     - GET  /             human-facing dashboard page
//!
//! error model:
//!     only a body that fails to parse as JSON is rejected (axum's Json
//!     extractor answers with a 4xx before the handler runs, so nothing
//!     mutates). anything parsable is accepted and normalized; the device
//!     cannot act on validation feedback anyway.
//!
//! relationships:
//!     - used by: main.rs (run_server)
//!     - uses: store.rs (TelemetryStore), domain.rs (wire types)
//!
//! ==============================================================================

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::{get, post},
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::config::HubConfig;
use crate::domain::{IngestAck, LatestState, Reading};
use crate::store::TelemetryStore;

/// shared between all request handlers
#[derive(Clone)]
pub struct HubState {
    pub store: Arc<RwLock<TelemetryStore>>,
    /// log each accepted reading to the console
    pub show_readings: bool,
}

/// build the router. CORS is permissive so the device (and any browser
/// viewer) can talk to the hub cross-origin.
pub fn router(state: HubState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/sensor", post(sensor_handler))
        .route("/api/data", get(data_handler))
        .route("/api/history", get(history_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: &HubConfig, state: HubState) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// device ingestion endpoint
///
/// the write lock spans the whole replace-and-append, so the latest record
/// and the history tail can never disagree even under concurrent posts.
async fn sensor_handler(
    State(state): State<HubState>,
    Json(payload): Json<Value>,
) -> Json<IngestAck> {
    let reading = {
        let mut store = state.store.write().await;
        store.ingest(&payload)
    };

    if state.show_readings {
        println!(
            "[INGEST] distance: {:.1} cm | temp: {:.1} C | rfid: {}",
            reading.distance, reading.temperature, reading.rfid
        );
    }

    Json(IngestAck {
        success: true,
        message: "Data received!".to_string(),
        timestamp: reading.timestamp,
    })
}

/// latest reading for programmatic access and the dashboard poller
async fn data_handler(State(state): State<HubState>) -> Json<LatestState> {
    let store = state.store.read().await;
    Json(store.latest())
}

/// trailing history, oldest-first. viewers wanting "most recent N" slice
/// it themselves.
async fn history_handler(State(state): State<HubState>) -> Json<Vec<Reading>> {
    let store = state.store.read().await;
    Json(store.history())
}

async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

// ==============================================================================
// dashboard page
// ==============================================================================
// pure presentation: polls /api/data and /api/history every 2 seconds.
// carries no hub logic.

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>ESP32 Pet Monitor</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: system-ui, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh; padding: 20px; color: #fff;
        }
        .container { max-width: 800px; margin: 0 auto; }
        h1 { text-align: center; margin-bottom: 30px; }
        .status-badge {
            display: inline-block; padding: 8px 16px; border-radius: 20px;
            font-size: 14px; font-weight: bold; margin-bottom: 20px;
        }
        .status-connected { background: #4CAF50; }
        .status-waiting { background: #ff9800; }
        .card {
            background: rgba(255, 255, 255, 0.95); border-radius: 15px;
            padding: 25px; margin-bottom: 20px; color: #333;
        }
        .sensor-grid {
            display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px; margin-top: 20px;
        }
        .sensor-box {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white; padding: 20px; border-radius: 12px; text-align: center;
        }
        .sensor-value { font-size: 32px; font-weight: bold; margin: 10px 0; }
        .info-text { color: #666; font-size: 14px; margin-top: 10px; }
        .log-container {
            max-height: 300px; overflow-y: auto; background: #f5f5f5;
            padding: 15px; border-radius: 8px; font-family: monospace; font-size: 12px;
        }
        .log-entry {
            margin-bottom: 8px; padding: 8px; background: white;
            border-radius: 4px; border-left: 3px solid #667eea;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>ESP32 Pet Monitor</h1>
        <div style="text-align: center;">
            <span id="statusBadge" class="status-badge status-waiting">Waiting for device...</span>
        </div>
        <div class="card">
            <h2>Current Sensor Readings</h2>
            <div class="sensor-grid">
                <div class="sensor-box">
                    <div>Distance</div>
                    <div class="sensor-value" id="distance">--</div>
                    <div>cm</div>
                </div>
                <div class="sensor-box">
                    <div>Temperature</div>
                    <div class="sensor-value" id="temperature">--</div>
                    <div>&deg;C</div>
                </div>
                <div class="sensor-box">
                    <div>RFID Tag</div>
                    <div class="sensor-value" id="rfid" style="font-size: 20px;">--</div>
                    <div>ID</div>
                </div>
            </div>
            <div class="info-text">Last update: <strong id="lastUpdate">Never</strong></div>
        </div>
        <div class="card">
            <h2>Data Log (last 10 readings)</h2>
            <div class="log-container" id="logContainer">No data yet...</div>
        </div>
        <div class="card">
            <h2>Connection Info</h2>
            <div style="background: #f5f5f5; padding: 15px; border-radius: 8px; font-family: monospace; font-size: 12px;">
                POST <span style="color: #667eea;">/api/sensor</span> with
                <code>{"distance": 45, "temperature": 28, "rfid": "ABC123"}</code>
            </div>
        </div>
    </div>
    <script>
        setInterval(fetchData, 2000);
        fetchData();

        async function fetchData() {
            try {
                const data = await (await fetch('/api/data')).json();
                document.getElementById('distance').textContent = data.distance;
                document.getElementById('temperature').textContent = data.temperature;
                document.getElementById('rfid').textContent = data.rfid;
                document.getElementById('lastUpdate').textContent = data.lastUpdate || 'Never';

                const badge = document.getElementById('statusBadge');
                if (data.status === 'connected') {
                    badge.className = 'status-badge status-connected';
                    badge.textContent = 'Connected';
                } else {
                    badge.className = 'status-badge status-waiting';
                    badge.textContent = 'Waiting for device...';
                }

                const history = await (await fetch('/api/history')).json();
                const log = document.getElementById('logContainer');
                if (history.length > 0) {
                    log.innerHTML = history.slice(-10).reverse().map(entry =>
                        `<div class="log-entry">[${entry.lastUpdate}] Distance: ${entry.distance}cm | ` +
                        `Temp: ${entry.temperature}&deg;C | RFID: ${entry.rfid}</div>`
                    ).join('');
                }
            } catch (err) {
                console.error('Error fetching data:', err);
            }
        }
    </script>
</body>
</html>
"#;

// ==============================================================================
// tests
// ==============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_state() -> HubState {
        HubState {
            store: Arc::new(RwLock::new(TelemetryStore::new())),
            show_readings: false,
        }
    }

    fn post_sensor(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sensor")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn data_returns_placeholder_before_ingestion() {
        let app = router(test_state());

        let response = app.oneshot(get("/api/data")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "waiting");
        assert_eq!(body["lastUpdate"], Value::Null);
        assert_eq!(body["distance"], 0.0);
        assert_eq!(body["rfid"], "none");
    }

    #[tokio::test]
    async fn post_then_get_round_trip() {
        let state = test_state();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(post_sensor(r#"{"distance":45,"temperature":28,"rfid":"ABC123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let ack = json_body(response).await;
        assert_eq!(ack["success"], true);
        assert!(ack["timestamp"].as_u64().unwrap() > 1_700_000_000_000);

        let data = json_body(app.clone().oneshot(get("/api/data")).await.unwrap()).await;
        assert_eq!(data["distance"], 45.0);
        assert_eq!(data["temperature"], 28.0);
        assert_eq!(data["rfid"], "ABC123");
        assert_eq!(data["status"], "connected");
        assert!(data["lastUpdate"].is_string());

        let history = json_body(app.oneshot(get("/api/history")).await.unwrap()).await;
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        let last = entries.last().unwrap();
        assert_eq!(last["distance"], 45.0);
        assert_eq!(last["temperature"], 28.0);
        assert_eq!(last["rfid"], "ABC123");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_without_mutation() {
        let state = test_state();
        let app = router(state.clone());

        let response = app
            .clone()
            .oneshot(post_sensor("{not json at all"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());

        // nothing was recorded
        let store = state.store.read().await;
        assert!(store.history().is_empty());
        assert_eq!(store.latest().last_update, None);
    }

    #[tokio::test]
    async fn partial_payload_is_normalized_not_rejected() {
        let app = router(test_state());

        let response = app
            .clone()
            .oneshot(post_sensor(r#"{"temperature":21.5}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let data = json_body(app.oneshot(get("/api/data")).await.unwrap()).await;
        assert_eq!(data["distance"], 0.0);
        assert_eq!(data["temperature"], 21.5);
        assert_eq!(data["rfid"], "none");
    }

    #[tokio::test]
    async fn history_stays_capped_over_http() {
        let app = router(test_state());

        for i in 0..55 {
            let body = format!(r#"{{"distance":{}}}"#, i);
            let response = app.clone().oneshot(post_sensor(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let history = json_body(app.oneshot(get("/api/history")).await.unwrap()).await;
        let entries = history.as_array().unwrap();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries.first().unwrap()["distance"], 5.0);
        assert_eq!(entries.last().unwrap()["distance"], 54.0);
    }

    #[tokio::test]
    async fn concurrent_posts_keep_latest_consistent_with_history() {
        let state = test_state();
        let app = router(state.clone());

        let mut tasks = Vec::new();
        for i in 0..32 {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                let body = format!(r#"{{"distance":{},"rfid":"tag-{}"}}"#, i, i);
                app.oneshot(post_sensor(&body)).await.unwrap()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().status(), StatusCode::OK);
        }

        // whatever order the posts landed in, the latest record must match
        // the newest history entry
        let store = state.store.read().await;
        let latest = store.latest();
        let newest = store.history().last().cloned().unwrap();
        assert_eq!(latest.distance, newest.distance);
        assert_eq!(latest.rfid, newest.rfid);
        assert_eq!(store.history().len(), 32);
    }

    #[tokio::test]
    async fn dashboard_serves_html() {
        let app = router(test_state());

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("ESP32 Pet Monitor"));
        assert!(page.contains("/api/data"));
    }
}
