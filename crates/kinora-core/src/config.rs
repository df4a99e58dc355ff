//! Configuration module
//!
//! Process configuration is read once at startup from the environment (optionally seeded
//! from a `.env` file) and validated before any collaborator is constructed.

use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 50051;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const CACHE_TTL_SECS: u64 = 300;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "compact" | "text" | "pretty" => Ok(LogFormat::Compact),
            other => Err(anyhow::anyhow!("Invalid log format: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO etc.)
    pub s3_endpoint: Option<String>,
    pub s3_use_ssl: bool,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// When unset the metadata cache is a no-op.
    pub redis_url: Option<String>,
    pub ttl_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub log_format: LogFormat,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    /// Directory for upload staging files; `None` uses the system temp dir.
    pub upload_staging_dir: Option<PathBuf>,
}

/// Parse a boolean flag. Accepts true/1/yes and false/0/no, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Load variables from an explicit env file. Variables already set in the process win.
pub fn load_env_file(path: &Path) -> Result<(), anyhow::Error> {
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file {}", path.display()))
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Compact,
        };

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StorageBackend::S3,
        };

        let s3_use_ssl = match lookup("S3_USE_SSL") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow::anyhow!("S3_USE_SSL must be a boolean, got {:?}", raw))?,
            None => true,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            s3_use_ssl,
            aws_access_key_id: lookup("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
        };

        let cache = CacheConfig {
            redis_url: lookup("REDIS_URL").filter(|s| !s.trim().is_empty()),
            ttl_secs: lookup("CACHE_TTL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(CACHE_TTL_SECS),
        };

        Ok(Config {
            server_port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            environment,
            log_format,
            database,
            storage,
            cache,
            upload_staging_dir: lookup("UPLOAD_STAGING_DIR").map(PathBuf::from),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(
            self.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database.url.starts_with("postgres://")
            && !self.database.url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.s3_endpoint.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION, AWS_REGION or S3_ENDPOINT must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if let Some(url) = &self.cache.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(anyhow::anyhow!("REDIS_URL must start with redis:// or rediss://"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kinora"),
            ("S3_BUCKET", "media"),
            ("S3_REGION", "us-east-1"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 50051);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.timeout_seconds, 30);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert!(config.storage.s3_use_ssl);
        assert_eq!(config.cache.ttl_secs, 300);
        assert!(config.cache.redis_url.is_none());
        assert_eq!(config.log_format, LogFormat::Compact);
        assert!(!config.is_production());
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_database_url_fails() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_local_backend_requires_path_and_base_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kinora"),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/media"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minio_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/kinora"),
            ("STORAGE_BACKEND", "minio"),
            ("S3_BUCKET", "media"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_USE_SSL", "no"),
            ("LOG_FORMAT", "json"),
            ("ENVIRONMENT", "prod"),
        ]))
        .unwrap();
        assert!(!config.storage.s3_use_ssl);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_bool() {
        for raw in ["true", "1", "YES"] {
            assert_eq!(parse_bool(raw), Some(true));
        }
        for raw in ["false", "0", "No"] {
            assert_eq!(parse_bool(raw), Some(false));
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/kinora"),
            ("S3_USE_SSL", "sometimes"),
        ]));
        assert!(result.is_err());
    }
}
