//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `focus` - Focus-area configuration
//! - `templates` - Action catalog entries
//! - `instances` - Append-only log of caregiver outcomes
//! - `summaries` - Confirmed weekly decisions
//!
//! `Database` also implements `HistoryRepository`, which is the only surface
//! the engines see.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{ActionInstance, ActionTemplate, FocusArea, WeeklySummary};
use crate::repository::{DateRange, HistoryRepository};

mod focus;
mod instances;
mod summaries;
mod templates;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "TEND_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the
/// same key, regardless of database path. This allows moving/renaming/
/// restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing
    // encrypted databases
    const APP_SALT: &[u8; 16] = b"tend-salt-v1-fix";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
///
/// Corrupt values surface as `InvalidData`. Substituting the current time
/// here would teleport a bad instance date into the active lookback window
/// and skew every derived signal.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::InvalidData(format!("Bad datetime '{}': {}", s, e)))
}

/// Format a DateTime<Utc> the way the schema stores it
pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `TEND_DB_KEY` environment variable to be set. The database
    /// will be encrypted using SQLCipher with a key derived from the
    /// passphrase via Argon2.
    ///
    /// Returns an error if `TEND_DB_KEY` is not set. Use `new_unencrypted()`
    /// for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        let encryption_key = std::env::var(DB_KEY_ENV).ok();
        match encryption_key {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: This creates an unencrypted database. Only use for
    /// development or testing. For production, use `new()` with
    /// `TEND_DB_KEY` set.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Set the key on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!("/tmp/tend_test_{}_{}.db", std::process::id(), id);

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Focus areas the family is working on
            CREATE TABLE IF NOT EXISTS focus_areas (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                started_at DATETIME NOT NULL,
                building_blocks TEXT NOT NULL DEFAULT '[]',
                pinned_micro_skill_titles TEXT NOT NULL DEFAULT '[]'
            );

            -- Action catalog. Rows are written by the content import only;
            -- rowid preserves catalog order for ranking tie-breaks.
            CREATE TABLE IF NOT EXISTS action_templates (
                id TEXT PRIMARY KEY,
                focus_id TEXT NOT NULL,
                title TEXT NOT NULL,
                why_line TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                difficulty INTEGER NOT NULL DEFAULT 1,
                variants TEXT NOT NULL DEFAULT '[]',
                contraindications TEXT NOT NULL DEFAULT '[]',
                content_version INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_templates_focus ON action_templates(focus_id);

            -- Append-only history of logged outcomes
            CREATE TABLE IF NOT EXISTS action_instances (
                id TEXT PRIMARY KEY,
                date DATETIME NOT NULL,
                focus_id TEXT NOT NULL,
                template_id TEXT NOT NULL,
                variant_duration INTEGER NOT NULL,
                status TEXT NOT NULL,
                felt_difficulty TEXT,
                note TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_instances_date ON action_instances(date);
            CREATE INDEX IF NOT EXISTS idx_instances_focus_date
                ON action_instances(focus_id, date);

            -- One confirmed decision per (focus, week); repeats supersede
            CREATE TABLE IF NOT EXISTS weekly_summaries (
                id TEXT PRIMARY KEY,
                week_start DATE NOT NULL,
                focus_id TEXT NOT NULL,
                win_text TEXT NOT NULL,
                hard_text TEXT NOT NULL,
                suggested_tweak TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(focus_id, week_start)
            );
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}

impl HistoryRepository for Database {
    fn fetch_action_templates(&self, focus_id: &str) -> Result<Vec<ActionTemplate>> {
        self.list_action_templates(focus_id)
    }

    fn fetch_action_instances(
        &self,
        range: DateRange,
        focus_id: Option<&str>,
    ) -> Result<Vec<ActionInstance>> {
        self.list_action_instances(range, focus_id)
    }

    fn fetch_focus_area(&self, focus_id: &str) -> Result<Option<FocusArea>> {
        self.get_focus_area(focus_id)
    }

    fn save_action_instance(&self, instance: &ActionInstance) -> Result<()> {
        self.insert_action_instance(instance).map(|_| ())
    }

    fn save_weekly_summary(&self, summary: &WeeklySummary) -> Result<()> {
        self.upsert_weekly_summary(summary)
    }
}
