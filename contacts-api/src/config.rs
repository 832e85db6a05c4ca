use config::{Config, ConfigError, File};
use contacts_core::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub import: ImportConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            }),
            server: Some(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            }),
            database: None,
            import: ImportConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// Deduplication and paging settings for contact creation and imports
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum number of Google connections reconciled per import
    pub google_page_size: usize,
    /// Maximum number of Google connections returned by the preview endpoint
    pub google_preview_page_size: usize,
    /// Duplicate checks applied when a single contact is created
    pub create_match: MatchPolicy,
    /// Duplicate checks applied to every candidate of an import batch
    pub import_match: MatchPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            google_page_size: 2000,
            google_preview_page_size: 200,
            create_match: MatchPolicy::PhoneOrName,
            import_match: MatchPolicy::PhoneOnly,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"
[cors]
allowed_origins = ["http://localhost:5173"]

[server]
host = "127.0.0.1"
port = 5000

[database]
# Defaults to the platform data directory
# path = "/var/lib/contactbook/contacts.db"

[import]
google_page_size = 2000
google_preview_page_size = 200
# "phone_only" or "phone_or_name"
create_match = "phone_or_name"
import_match = "phone_only"
"#;

impl ApiConfig {
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn listen_address(&self) -> (String, u16) {
        match &self.server {
            Some(server) => (server.host.clone(), server.port),
            None => ("127.0.0.1".to_string(), 5000),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("contactbook").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
