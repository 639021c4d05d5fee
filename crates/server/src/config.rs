use std::{fs, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub store_latency_ms: u64,
    pub seed_on_startup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/catalog.db".into(),
            store_latency_ms: 1000,
            seed_on_startup: true,
        }
    }
}

impl Settings {
    pub fn store_latency(&self) -> Duration {
        Duration::from_millis(self.store_latency_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    store_latency_ms: Option<u64>,
    seed_on_startup: Option<bool>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then environment. Unparseable values are
/// skipped.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.store_latency_ms {
                    settings.store_latency_ms = v;
                }
                if let Some(v) = file_cfg.seed_on_startup {
                    settings.seed_on_startup = v;
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable {SETTINGS_FILE}"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__STORE_LATENCY_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.store_latency_ms = parsed;
        }
    }

    if let Some(v) = env("APP__SEED_ON_STARTUP") {
        if let Ok(parsed) = v.trim().parse::<bool>() {
            settings.seed_on_startup = parsed;
        }
    }

    settings
}

/// Turns a bare path or `sqlite:` path into a `sqlite://` url. Directory
/// creation is left to `Storage::new`.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
