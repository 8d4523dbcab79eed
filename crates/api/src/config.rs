use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL. Unset runs on the in-memory store.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// argon2 PHC string of the shared admin password.
    pub admin_password_hash: Option<String>,
    /// Session cookie signing secret.
    pub jwt_secret: String,
    pub session_ttl: Duration,
    /// Mark the session cookie `Secure`.
    pub cookie_secure: bool,
    /// Drafts idle longer than this are dropped.
    pub draft_ttl: Duration,
    pub draft_sweep_interval: Duration,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    pub media_dir: PathBuf,
    /// Prefix for blob URLs handed to clients.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    /// Markdown directory seeded at startup.
    pub seed_dir: Option<PathBuf>,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 3030)?,
            database_url: var("DATABASE_URL"),
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: parse(&lookup, "DB_MIN_CONNECTIONS", 5)?,
            admin_password_hash: var("ADMIN_PASSWORD_HASH"),
            jwt_secret: var("JWT_SECRET")
                .unwrap_or_else(|| "dev-secret-change-me-in-production".to_string()),
            session_ttl: Duration::from_secs(parse::<u64, _>(&lookup, "SESSION_TTL_HOURS", 168)? * 3600),
            cookie_secure: parse(&lookup, "COOKIE_SECURE", false)?,
            draft_ttl: Duration::from_secs(parse(&lookup, "DRAFT_TTL_SECS", 600)?),
            draft_sweep_interval: Duration::from_secs(parse(&lookup, "DRAFT_SWEEP_SECS", 60)?),
            event_bus_capacity: parse_nonzero(&lookup, "EVENT_BUS_CAPACITY", 1024)?,
            media_dir: var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/media")),
            public_base_url: var("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3030".to_string()),
            max_upload_bytes: parse(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            seed_dir: var("SEED_DIR").map(PathBuf::from),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_nonzero<F>(lookup: &F, var: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse(lookup, var, default)? {
        0 => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
        }),
        n => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let loaded = config(&[]).unwrap();
        assert_eq!(loaded.addr(), "0.0.0.0:3030");
        assert!(loaded.database_url.is_none());
        assert_eq!(loaded.session_ttl, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(loaded.draft_ttl, Duration::from_secs(600));
        assert!(!loaded.cookie_secure);
    }

    #[test]
    fn overrides_and_errors() {
        let loaded = config(&[
            ("PORT", "8080"),
            ("COOKIE_SECURE", "true"),
            ("DATABASE_URL", "postgres://x"),
        ])
        .unwrap();
        assert_eq!(loaded.port, 8080);
        assert!(loaded.cookie_secure);
        assert_eq!(loaded.database_url.as_deref(), Some("postgres://x"));

        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = config(&[("EVENT_BUS_CAPACITY", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "EVENT_BUS_CAPACITY", .. }));
    }
}
