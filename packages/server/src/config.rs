use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Log every SQL statement at debug level.
    pub sqlx_logging: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per bucket.
    pub root: PathBuf,
    /// Bucket that product images are uploaded to.
    pub bucket: String,
    /// Prefix of the public object URLs, e.g. `http://localhost:3000/storage`.
    pub public_base_url: String,
    /// Maximum size of an uploaded image in bytes.
    pub max_object_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `server=debug`.
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.sqlx_logging", false)?
            .set_default("storage.root", "./data/storage")?
            .set_default("storage.bucket", "products")?
            .set_default("storage.public_base_url", "http://127.0.0.1:3000/storage")?
            .set_default("storage.max_object_size", 10 * 1024 * 1024)?
            .set_default("log.level", "info")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., SHOWCASE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("SHOWCASE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
