//! Persistence Layer
//!
//! SQLite storage for score sheets and the roster data the leaderboard joins
//! against, via sqlx. An in-memory store with the same contract lives in
//! `memory`.
//!
//! # Database Schema
//!
//! ## scores
//! - gymnast_id, event_id, apparatus_id: UNIQUE together, one sheet per key
//! - judge_id: last submitting judge
//! - d1..d4, a1..a3, e1..e3, technical_deduction: REAL, 0 = not provided
//! - created_at / updated_at: Timestamps
//!
//! ## gymnasts
//! - id, name, category, team (nullable)
//!
//! ## apparatus
//! - id, name
//!
//! ## judge_assignments
//! - judge_id, event_id, apparatus_id: PRIMARY KEY together

pub mod memory;
pub mod models;
pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

/// Initialize the database connection pool and run migrations
///
/// In-memory URLs get a single long-lived connection so every query sees the
/// same database.
pub async fn init_database(config: &DatabaseConfig) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", config.url);

    // Ensure data directory exists
    if let Some(db_path) = config.url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
                })?;
            }
        }
    }

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !config.log_queries {
        options = options.disable_statement_logging();
    }

    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

/// Run database migrations
async fn run_migrations(pool: &DbPool) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS gymnasts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            team TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create gymnasts table: {}", e))
    })?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS apparatus (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create apparatus table: {}", e))
    })?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS judge_assignments (
            judge_id INTEGER NOT NULL,
            event_id INTEGER NOT NULL,
            apparatus_id INTEGER NOT NULL,
            PRIMARY KEY (judge_id, event_id, apparatus_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create judge_assignments table: {}", e))
    })?;

    // The UNIQUE key is what makes ON CONFLICT upserts atomic
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            gymnast_id INTEGER NOT NULL REFERENCES gymnasts(id),
            event_id INTEGER NOT NULL,
            apparatus_id INTEGER NOT NULL REFERENCES apparatus(id),
            judge_id INTEGER NOT NULL,
            d1 REAL NOT NULL DEFAULT 0.0,
            d2 REAL NOT NULL DEFAULT 0.0,
            d3 REAL NOT NULL DEFAULT 0.0,
            d4 REAL NOT NULL DEFAULT 0.0,
            a1 REAL NOT NULL DEFAULT 0.0,
            a2 REAL NOT NULL DEFAULT 0.0,
            a3 REAL NOT NULL DEFAULT 0.0,
            e1 REAL NOT NULL DEFAULT 0.0,
            e2 REAL NOT NULL DEFAULT 0.0,
            e3 REAL NOT NULL DEFAULT 0.0,
            technical_deduction REAL NOT NULL DEFAULT 0.0,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            UNIQUE (gymnast_id, event_id, apparatus_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create scores table: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scores_event ON scores(event_id)")
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_gymnasts_category ON gymnasts(category)")
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    info!("✓ Database migrations completed successfully");

    Ok(())
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/gymscore.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Enable query logging
    pub log_queries: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/gymscore.db".to_string(),
            max_connections: 5,
            log_queries: cfg!(debug_assertions),
        }
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory database, used by tests
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            log_queries: false,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let url = std::env::var("DATABASE_URL").unwrap_or(defaults.url);

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &u32| *n > 0)
            .unwrap_or(defaults.max_connections);

        let log_queries = std::env::var("DATABASE_LOG_QUERIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_queries);

        Self {
            url,
            max_connections,
            log_queries,
        }
    }
}
