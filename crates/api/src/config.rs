use std::path::PathBuf;

use crate::ai::AiConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `forms.json` and `submissions.json` (default: `./data`).
    pub data_dir: PathBuf,
    /// Insert the demo forms into an empty store at startup (default: `false`).
    pub seed_demo_forms: bool,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Schema generation endpoint configuration.
    pub ai: AiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATA_DIR`             | `./data`                   |
    /// | `SEED_DEMO_FORMS`      | `false`                    |
    ///
    /// JWT and AI settings are read by [`JwtConfig::from_env`] and
    /// [`AiConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let seed_demo_forms: bool = std::env::var("SEED_DEMO_FORMS")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("SEED_DEMO_FORMS must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            seed_demo_forms,
            jwt: JwtConfig::from_env(),
            ai: AiConfig::from_env(),
        }
    }
}
