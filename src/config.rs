//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `hub.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: bind address and port for the HTTP surface.
//!     - LoggingConfig: log level and per-reading console output toggle.
//!     - SimulatorConfig: push cadence and target for the stand-in device.
//!
//! the PORT environment variable overrides the configured port, so the hub
//! can run on hosting platforms that assign the port at deploy time.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub show_readings: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    /// where the simulator pushes readings
    pub hub_url: String,
    pub interval_seconds: u64,
}

impl HubConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: HubConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Load with default fallback, then apply the PORT env override
    pub fn load_or_default() -> Self {
        let paths = [
            std::path::PathBuf::from("config").join("hub.toml"),
            std::path::PathBuf::from("..").join("config").join("hub.toml"),
        ];

        let mut config = None;
        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(c) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        config = Some(c);
                        break;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_else(|| {
            println!("[CONFIG] Warning: No config file found - using defaults");
            Self::default()
        });

        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(port) => {
                    println!("[CONFIG] PORT env override: {}", port);
                    config.server.port = port;
                }
                Err(_) => {
                    println!("[CONFIG] Warning: Ignoring unparsable PORT env var: {}", port);
                }
            }
        }

        config
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("┌─────────────────────────────────────────┐");
        println!("│            HUB CONFIGURATION            │");
        println!("├─────────────────────────────────────────┤");
        println!("│ Bind: {}                         │", self.server.bind);
        println!("│ Port: {}                              │", self.server.port);
        println!("│ Log Level: {}                         │", self.logging.level);
        println!("│ Show Readings: {}                     │", self.logging.show_readings);
        println!("└─────────────────────────────────────────┘");
    }

    /// socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_readings: true,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            hub_url: "http://127.0.0.1:3000".to_string(),
            interval_seconds: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            [server]
            bind = "127.0.0.1"
            port = 8080

            [logging]
            level = "debug"
            show_readings = false

            [simulator]
            hub_url = "http://hub.local:8080"
            interval_seconds = 5
        "#;
        let config: HubConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulator.interval_seconds, 5);
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let config: HubConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert!(config.logging.show_readings);
    }
}
