//! Read access to the influencer analysis table.

use crate::config::DatabaseConfig;
use crate::models::{InfluencerRecord, InfluencerSummary, RecordId};
use crate::services::metrics::record_db_query;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::ExposeSecret;
use serde_json::Value;
use service_core::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// `table` or `schema.table`, unquoted identifiers only.
static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("table name pattern is valid")
});

#[async_trait]
pub trait InfluencerRepository: Send + Sync {
    /// Every record as `{id, username}`, in storage order.
    async fn list_influencers(&self) -> Result<Vec<InfluencerSummary>, AppError>;
    /// The full row for `id`; the first one if several match.
    async fn get_influencer(&self, id: RecordId) -> Result<Option<InfluencerRecord>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
    /// Release pooled resources. Called once by the owning application.
    async fn close(&self) {}
}

/// Identifiers cannot be bound as parameters, so the configured table name
/// is checked before it is spliced into query text.
pub fn validate_table_name(table: &str) -> Result<&str, AppError> {
    if TABLE_NAME.is_match(table) {
        Ok(table)
    } else {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "Invalid table name: {}",
            table
        )))
    }
}

/// Postgres-backed repository over a shared connection pool.
#[derive(Clone)]
pub struct PgInfluencerRepository {
    pool: PgPool,
    list_sql: String,
    get_sql: String,
}

impl PgInfluencerRepository {
    /// Open the connection pool.
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let table = validate_table_name(&config.table)?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            ssl_mode = ?config.ssl_mode,
            "Connecting to PostgreSQL"
        );

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.name)
            .ssl_mode(config.ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self::over_table(pool, table))
    }

    /// Wrap an existing pool reading from `table`.
    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self, AppError> {
        let table = validate_table_name(table)?;
        Ok(Self::over_table(pool, table))
    }

    fn over_table(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            list_sql: format!("SELECT id::bigint AS id, username::text AS username FROM {table}"),
            get_sql: format!(
                "SELECT to_jsonb(t) AS record FROM {table} AS t WHERE t.id = $1 LIMIT 1"
            ),
        }
    }
}

#[async_trait]
impl InfluencerRepository for PgInfluencerRepository {
    #[instrument(skip(self))]
    async fn list_influencers(&self) -> Result<Vec<InfluencerSummary>, AppError> {
        let started = Instant::now();

        let rows = sqlx::query_as::<_, InfluencerSummary>(&self.list_sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to list influencers: {}", e))
            })?;

        record_db_query("list_influencers", started.elapsed());
        Ok(rows)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_influencer(&self, id: RecordId) -> Result<Option<InfluencerRecord>, AppError> {
        let started = Instant::now();

        let record = sqlx::query_scalar::<_, Json<InfluencerRecord>>(&self.get_sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get influencer: {}", e))
            })?;

        record_db_query("get_influencer", started.elapsed());
        Ok(record.map(|Json(record)| record))
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let started = Instant::now();

        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;

        record_db_query("health_check", started.elapsed());
        Ok(())
    }

    async fn close(&self) {
        info!("Closing PostgreSQL connection pool");
        self.pool.close().await;
    }
}

/// Repository over a fixed set of rows, for tests and local runs without a
/// database.
#[derive(Default)]
pub struct InMemoryInfluencerRepository {
    records: Vec<InfluencerRecord>,
    unavailable: AtomicBool,
}

impl InMemoryInfluencerRepository {
    pub fn new(records: Vec<InfluencerRecord>) -> Self {
        Self {
            records,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Build from JSON objects; anything that is not an object is skipped.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(
            values
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Make every subsequent call fail like a lost database connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused (in-memory repository marked unavailable)"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InfluencerRepository for InMemoryInfluencerRepository {
    async fn list_influencers(&self) -> Result<Vec<InfluencerSummary>, AppError> {
        self.check_available()?;

        Ok(self
            .records
            .iter()
            .filter_map(|record| {
                Some(InfluencerSummary {
                    id: record.get("id")?.as_i64()?,
                    username: record
                        .get("username")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            })
            .collect())
    }

    async fn get_influencer(&self, id: RecordId) -> Result<Option<InfluencerRecord>, AppError> {
        self.check_available()?;

        Ok(self
            .records
            .iter()
            .find(|record| record.get("id").and_then(Value::as_i64) == Some(id.get()))
            .cloned())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repository() -> InMemoryInfluencerRepository {
        InMemoryInfluencerRepository::from_values(vec![
            json!({ "id": 1, "username": "alice", "risk_level": "Low" }),
            json!({ "id": 2, "username": "bob", "risk_level": "High" }),
            json!({ "id": 2, "username": "bob-duplicate" }),
        ])
    }

    #[test]
    fn table_names_must_be_plain_identifiers() {
        assert!(validate_table_name("scrapped.instagram_profile_analysis").is_ok());
        assert!(validate_table_name("profiles").is_ok());
        assert!(validate_table_name("_staging.p2").is_ok());

        for bad in [
            "",
            "a.b.c",
            "profiles; DROP TABLE x",
            "\"quoted\"",
            "1table",
            "public.",
        ] {
            assert!(
                matches!(validate_table_name(bad), Err(AppError::ConfigError(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn connect_rejects_bad_table_before_dialing() {
        // Nothing listens on port 1; a connection attempt would surface as a
        // database error rather than a configuration error.
        let config = DatabaseConfig {
            user: "analytics".to_string(),
            host: "127.0.0.1".to_string(),
            name: "influencers".to_string(),
            password: secrecy::Secret::new("secret".to_string()),
            port: 1,
            ssl_mode: sqlx::postgres::PgSslMode::Disable,
            max_connections: 1,
            min_connections: 0,
            table: "profiles; DROP TABLE x".to_string(),
        };

        assert!(matches!(
            PgInfluencerRepository::connect(&config).await,
            Err(AppError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn in_memory_list_projects_id_and_username() {
        let summaries = repository().list_influencers().await.unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(
            summaries[0],
            InfluencerSummary {
                id: 1,
                username: Some("alice".to_string())
            }
        );
    }

    #[tokio::test]
    async fn in_memory_get_returns_first_match() {
        let record = repository()
            .get_influencer(RecordId::new(2))
            .await
            .unwrap()
            .expect("record 2 exists");
        assert_eq!(record["username"], "bob");

        assert!(repository()
            .get_influencer(RecordId::new(99))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unavailable_repository_reports_database_errors() {
        let repo = repository();
        repo.set_unavailable(true);

        assert!(matches!(
            repo.list_influencers().await,
            Err(AppError::DatabaseError(_))
        ));
        assert!(matches!(
            repo.health_check().await,
            Err(AppError::DatabaseError(_))
        ));

        repo.set_unavailable(false);
        assert!(repo.health_check().await.is_ok());
    }
}
