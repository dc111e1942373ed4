use std::time::Duration;

use anyhow::{Context, Result, anyhow};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub log_level: String,
    pub http_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("AUCTION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());
        let http_timeout_secs = parse_positive_u64(
            "HTTP_TIMEOUT_SECS",
            std::env::var("HTTP_TIMEOUT_SECS").ok(),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url: normalize_server(api_url),
            log_level,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// `--server` перекрывает `AUCTION_API_URL`.
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.api_url = normalize_server(server);
        }
        self
    }
}

pub fn normalize_server(server: String) -> String {
    let server = server.trim().to_string();
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_positive_u64(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    let value = match raw {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?,
        None => default,
    };

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
