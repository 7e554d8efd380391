use serde::Deserialize;
use std::env;

// Top-level configuration container
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
}

// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rust_log: String,
}

// Remote booking API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "ticket_dashboard=debug".to_string()),
            },
            api: ApiConfig {
                base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
                poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("POLL_INTERVAL_SECS must be a valid number"),
                http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("HTTP_TIMEOUT_SECS must be a valid number"),
            },
        }
    }
}
