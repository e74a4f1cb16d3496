//! Configuration module for influencer-service.

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use sqlx::postgres::PgSslMode;
use std::env;

pub const DEFAULT_TABLE: &str = "scrapped.instagram_profile_analysis";

#[derive(Debug, Clone)]
pub struct InfluencerConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub user: String,
    pub host: String,
    pub name: String,
    pub password: Secret<String>,
    pub port: u16,
    /// `require` encrypts the connection without validating the server
    /// certificate.
    pub ssl_mode: PgSslMode,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Schema-qualified table holding the analysis rows.
    pub table: String,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl InfluencerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "influencer-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig::from_env()?,
            cors: CorsConfig {
                allowed_origins: parse_origins(
                    &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
                ),
            },
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            user: required("DB_USER")?,
            host: required("DB_HOST")?,
            name: required("DB_NAME")?,
            password: Secret::new(required("DB_PASSWORD")?),
            port: match env::var("DB_PORT") {
                Ok(raw) => parse_port(&raw)?,
                Err(_) => 5432,
            },
            ssl_mode: env::var("DB_SSL_MODE")
                .unwrap_or_else(|_| "require".to_string())
                .parse()
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DB_SSL_MODE: {}", e)))?,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            table: env::var("INFLUENCER_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!("{} is required", key)))
}

fn parse_port(raw: &str) -> Result<u16, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!("Invalid DB_PORT: {}", raw)))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(str::to_string)
        .collect()
}
