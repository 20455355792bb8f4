use std::fmt;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`).
    pub request_timeout_secs: u64,
    /// Upper bound on a single training run in seconds (default: `120`).
    pub training_timeout_secs: u64,
    /// Largest accepted request body, including dataset uploads (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// Operator account provisioned at startup.
    pub central_admin: CentralAdminConfig,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

/// Credentials of the central operator account.
#[derive(Clone)]
pub struct CentralAdminConfig {
    /// Login name (default: `admin`).
    pub username: String,
    /// Plaintext password. Without it no operator account is provisioned
    /// and central login always fails.
    pub password: Option<String>,
}

impl fmt::Debug for CentralAdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CentralAdminConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                            |
    /// |--------------------------|----------------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                          |
    /// | `PORT`                   | `8000`                                             |
    /// | `CORS_ORIGINS`           | `http://localhost:5173,http://127.0.0.1:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`   | `300`                                              |
    /// | `TRAINING_TIMEOUT_SECS`  | `120`                                              |
    /// | `MAX_UPLOAD_BYTES`       | `10485760`                                         |
    /// | `CENTRAL_ADMIN_USERNAME` | `admin`                                            |
    /// | `CENTRAL_ADMIN_PASSWORD` | unset                                              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let training_timeout_secs: u64 = std::env::var("TRAINING_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("TRAINING_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "10485760".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let central_admin = CentralAdminConfig {
            username: std::env::var("CENTRAL_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            password: std::env::var("CENTRAL_ADMIN_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            training_timeout_secs,
            max_upload_bytes,
            central_admin,
            jwt,
        }
    }
}
