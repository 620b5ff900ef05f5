//! Environment-driven application configuration.
//!
//! Loaded once at startup (`init_config`) and read through `get_config`
//! everywhere else. `.env` files are honored via dotenvy before the process
//! environment is consulted.

use std::env;

use once_cell::sync::OnceCell;

static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_prefix: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `file` (default) or `memory`
    pub backend: String,
    pub file_path: String,
    /// length of generated link ids
    pub id_length: usize,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// empty or unset means stdout
    pub file: Option<String>,
    /// `plain` or `json`
    pub format: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8080),
                admin_prefix: env::var("ADMIN_ROUTE_PREFIX")
                    .unwrap_or_else(|_| "/admin".to_string()),
            },
            storage: StorageConfig {
                backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".to_string()),
                file_path: env::var("DB_FILE_NAME").unwrap_or_else(|_| "links.json".to_string()),
                id_length: env::var("RANDOM_CODE_LENGTH")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(6),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                file: env::var("LOG_FILE").ok().filter(|f| !f.is_empty()),
                format: env::var("LOG_FORMAT").unwrap_or_else(|_| "plain".to_string()),
            },
        }
    }
}

/// Load configuration from the environment, once. Later calls return the
/// already-initialized value.
pub fn init_config() -> &'static AppConfig {
    APP_CONFIG.get_or_init(AppConfig::from_env)
}

pub fn get_config() -> &'static AppConfig {
    APP_CONFIG
        .get()
        .expect("configuration is not initialized, call init_config() first")
}
