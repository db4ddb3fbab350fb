use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Google sign-in settings.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id; empty disables Google sign-in.
    pub client_id: String,
    /// Address that is always allowed in and promoted to admin.
    pub superuser_email: String,
    /// Invitations are restricted to this mail domain.
    pub allowed_domain: String,
    /// Where the RS256 signing keys are published.
    pub jwks_url: String,
}

impl GoogleConfig {
    pub fn enabled(&self) -> bool {
        !self.client_id.is_empty()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and session secret have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Mark the session cookie `Secure` (default: `false`).
    pub cookie_secure: bool,
    /// Per-subscriber queue length of the entry event stream (default: `128`).
    pub entry_event_queue_size: usize,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Session token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                      |
    /// |--------------------------|----------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                    |
    /// | `PORT`                   | `3000`                                       |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`                      |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                         |
    /// | `COOKIE_SECURE`          | `false`                                      |
    /// | `ENTRY_EVENT_QUEUE_SIZE` | `128`                                        |
    /// | `STATIC_DIR`             | `crates/api/static`                          |
    /// | `GOOGLE_CLIENT_ID`       | empty                                        |
    /// | `GOOGLE_SUPERUSER_EMAIL` | empty                                        |
    /// | `GOOGLE_ALLOWED_DOMAIN`  | `gmail.com`                                  |
    /// | `GOOGLE_JWKS_URL`        | `https://www.googleapis.com/oauth2/v3/certs` |
    ///
    /// Session settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let entry_event_queue_size: usize = std::env::var("ENTRY_EVENT_QUEUE_SIZE")
            .unwrap_or_else(|_| hermas_events::bus::DEFAULT_CAPACITY.to_string())
            .parse()
            .expect("ENTRY_EVENT_QUEUE_SIZE must be a valid usize");

        let static_dir = PathBuf::from(
            std::env::var("STATIC_DIR").unwrap_or_else(|_| "crates/api/static".into()),
        );

        let google = GoogleConfig {
            client_id: env_trimmed("GOOGLE_CLIENT_ID", ""),
            superuser_email: env_trimmed("GOOGLE_SUPERUSER_EMAIL", "").to_lowercase(),
            allowed_domain: env_trimmed("GOOGLE_ALLOWED_DOMAIN", "gmail.com").to_lowercase(),
            jwks_url: env_trimmed(
                "GOOGLE_JWKS_URL",
                "https://www.googleapis.com/oauth2/v3/certs",
            ),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cookie_secure,
            entry_event_queue_size,
            static_dir,
            jwt,
            google,
        }
    }
}

fn env_trimmed(key: &str, default: &str) -> String {
    std::env::var(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string())
}
