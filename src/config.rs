use std::env;
use std::path::PathBuf;

/// Which implementation backs the record, account and role stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    Postgres,
    Memory,
}

impl DataBackend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Some(DataBackend::Postgres),
            "memory" | "mem" => Some(DataBackend::Memory),
            _ => None,
        }
    }
}

/// Runtime configuration, read from the process environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub data_backend: DataBackend,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub storage_root: PathBuf,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub analytics_url: String,
    pub supervisor_email: Option<String>,
    pub supervisor_password: Option<String>,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "postgres://localhost/inmed_site".to_string(),
            data_backend: DataBackend::Postgres,
            session_key: None,
            cookie_secure: false,
            storage_root: PathBuf::from("data/storage"),
            public_base_url: String::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            analytics_url: "https://analytics.google.com".to_string(),
            supervisor_email: None,
            supervisor_password: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let data_backend = match env::var("DATA_BACKEND") {
            Ok(raw) => DataBackend::parse(&raw).unwrap_or_else(|| {
                log::warn!("Unknown DATA_BACKEND '{raw}', falling back to postgres");
                DataBackend::Postgres
            }),
            Err(_) => defaults.data_backend,
        };

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("MAX_UPLOAD_BYTES '{raw}' is not a number, using default");
                DEFAULT_MAX_UPLOAD_BYTES
            }),
            Err(_) => defaults.max_upload_bytes,
        };

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            data_backend,
            session_key: env::var("SESSION_KEY").ok(),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(defaults.cookie_secure),
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            max_upload_bytes,
            analytics_url: env::var("ANALYTICS_URL").unwrap_or(defaults.analytics_url),
            supervisor_email: env::var("SUPERVISOR_EMAIL").ok().filter(|v| !v.trim().is_empty()),
            supervisor_password: env::var("SUPERVISOR_PASSWORD").ok().filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(DataBackend::parse("Postgres"), Some(DataBackend::Postgres));
        assert_eq!(DataBackend::parse(" memory "), Some(DataBackend::Memory));
        assert_eq!(DataBackend::parse("sqlite"), None);
    }
}
