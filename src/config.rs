/// Configuration management for the SortedShelf services
use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The three independently deployable services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Auth,
    Media,
    Collection,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::Auth, ServiceKind::Media, ServiceKind::Collection];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Auth => "auth",
            ServiceKind::Media => "media",
            ServiceKind::Collection => "collection",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auth" => Ok(ServiceKind::Auth),
            "media" => Ok(ServiceKind::Media),
            "collection" => Ok(ServiceKind::Collection),
            other => Err(ShelfError::Validation(format!("Unknown service: {}", other))),
        }
    }
}

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub media_client: MediaClientConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Listening addresses and the set of services this process runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub enabled: Vec<ServiceKind>,
    pub auth_port: u16,
    pub media_port: u16,
    pub collection_port: u16,
}

impl ServiceConfig {
    pub fn port_for(&self, kind: ServiceKind) -> u16 {
        match kind {
            ServiceKind::Auth => self.auth_port,
            ServiceKind::Media => self.media_port,
            ServiceKind::Collection => self.collection_port,
        }
    }
}

/// Storage configuration, one SQLite database per service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub auth_db: PathBuf,
    pub media_db: PathBuf,
    pub collection_db: PathBuf,
    pub max_connections: u32,
}

impl StorageConfig {
    pub fn db_path(&self, kind: ServiceKind) -> &PathBuf {
        match kind {
            ServiceKind::Auth => &self.auth_db,
            ServiceKind::Media => &self.media_db,
            ServiceKind::Collection => &self.collection_db,
        }
    }
}

/// How the collection service talks to the media service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaClientConfig {
    /// Base URL of the media service, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of in-flight media fetches per aggregation
    pub max_concurrent: usize,
}

/// Allowed browser origins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ShelfResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("SHELF_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());

        let enabled = split_list(
            &env::var("SHELF_SERVICES").unwrap_or_else(|_| "auth,media,collection".to_string()),
        )
        .iter()
        .map(|s| s.parse())
        .collect::<ShelfResult<Vec<ServiceKind>>>()?;

        let port = |key: &str, default: &str| -> ShelfResult<u16> {
            env::var(key)
                .unwrap_or_else(|_| default.to_string())
                .parse()
                .map_err(|_| ShelfError::Validation(format!("Invalid port number in {}", key)))
        };
        let auth_port = port("SHELF_AUTH_PORT", "5001")?;
        let media_port = port("SHELF_MEDIA_PORT", "5002")?;
        let collection_port = port("SHELF_COLLECTION_PORT", "5003")?;

        let data_directory: PathBuf = env::var("SHELF_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let auth_db = env::var("SHELF_AUTH_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("auth.sqlite"));
        let media_db = env::var("SHELF_MEDIA_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("media.sqlite"));
        let collection_db = env::var("SHELF_COLLECTION_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("collection.sqlite"));
        let max_connections = env_or("SHELF_DB_MAX_CONNECTIONS", 10);

        let base_url = env::var("SHELF_MEDIA_SERVICE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, media_port))
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = env_or("SHELF_MEDIA_FETCH_TIMEOUT_SECS", 2);
        let max_concurrent = env_or("SHELF_MEDIA_FETCH_CONCURRENCY", 8);

        let allowed_origins = split_list(
            &env::var("SHELF_CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "sorted_shelf=debug,tower_http=debug".to_string());
        let json = env::var("SHELF_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                enabled,
                auth_port,
                media_port,
                collection_port,
            },
            storage: StorageConfig {
                data_directory,
                auth_db,
                media_db,
                collection_db,
                max_connections,
            },
            media_client: MediaClientConfig {
                base_url,
                timeout_secs,
                max_concurrent,
            },
            cors: CorsConfig { allowed_origins },
            logging: LoggingConfig { level, json },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ShelfResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ShelfError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.enabled.is_empty() {
            return Err(ShelfError::Validation(
                "At least one service must be enabled".to_string(),
            ));
        }

        let mut ports: Vec<u16> = self
            .service
            .enabled
            .iter()
            .map(|kind| self.service.port_for(*kind))
            .collect();
        ports.sort_unstable();
        let before = ports.len();
        ports.dedup();
        if ports.len() != before {
            return Err(ShelfError::Validation(
                "Enabled services must listen on distinct ports".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(ShelfError::Validation(
                "Database pool needs at least one connection".to_string(),
            ));
        }

        if self.media_client.timeout_secs == 0 {
            return Err(ShelfError::Validation(
                "Media fetch timeout must be positive".to_string(),
            ));
        }

        if self.media_client.max_concurrent == 0 {
            return Err(ShelfError::Validation(
                "Media fetch concurrency must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            enabled: ServiceKind::ALL.to_vec(),
            auth_port: 5001,
            media_port: 5002,
            collection_port: 5003,
        },
        storage: StorageConfig {
            data_directory: "./data".into(),
            auth_db: "./data/auth.sqlite".into(),
            media_db: "./data/media.sqlite".into(),
            collection_db: "./data/collection.sqlite".into(),
            max_connections: 1,
        },
        media_client: MediaClientConfig {
            base_url: "http://127.0.0.1:5002".to_string(),
            timeout_secs: 2,
            max_concurrent: 8,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            json: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_parsing() {
        assert_eq!("auth".parse::<ServiceKind>().unwrap(), ServiceKind::Auth);
        assert_eq!(" Media ".parse::<ServiceKind>().unwrap(), ServiceKind::Media);
        assert_eq!("collection".parse::<ServiceKind>().unwrap(), ServiceKind::Collection);
        assert!("catalog".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list("a, b,,c ,"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_duplicate_ports_rejected() {
        let mut config = test_config();
        config.service.collection_port = config.service.media_port;
        assert!(config.validate().is_err());

        // A disabled service may share a port with an enabled one
        config.service.enabled = vec![ServiceKind::Auth, ServiceKind::Media];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = test_config();
        config.media_client.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.media_client.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
