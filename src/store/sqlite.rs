//! SQLite store with automatic schema migration
//!
//! All statements run on a `spawn_blocking` thread against a single shared
//! connection.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use super::{LedgerStore, SessionStore};
use crate::domain::{TopicId, UserId};
use crate::error::{ProgressionError, Result};
use crate::progression::{Award, ProgressLedger, SessionState};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
INSERT OR IGNORE INTO schema_version VALUES (1);

-- One row per user, created on first access
CREATE TABLE IF NOT EXISTS ledgers (
    user_id TEXT PRIMARY KEY,
    total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
    solved_count INTEGER NOT NULL DEFAULT 0 CHECK (solved_count >= 0),
    solved_without_hint_count INTEGER NOT NULL DEFAULT 0
        CHECK (solved_without_hint_count >= 0 AND solved_without_hint_count <= solved_count),
    version INTEGER NOT NULL DEFAULT 0,
    updated_at INTEGER
);

-- Per-topic counters, a row appears the first time a topic is credited
CREATE TABLE IF NOT EXISTS topic_progress (
    user_id TEXT NOT NULL REFERENCES ledgers(user_id),
    topic_id INTEGER NOT NULL CHECK (topic_id BETWEEN 1 AND 17),
    count INTEGER NOT NULL DEFAULT 0 CHECK (count >= 0),
    PRIMARY KEY (user_id, topic_id)
);
"#;

/// Ledger and session store backed by a SQLite file
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ProgressionError::Storage(format!(
                    "Failed to create data dir {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)?;

        // WAL so a second process (another device sync, a CLI) can read while we write
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking thread
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| ProgressionError::Storage("SQLite lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| ProgressionError::Storage(format!("SQLite task failed: {}", e)))?
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    // Migration 2: persisted sessions
    if version < 2 {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                user_id TEXT PRIMARY KEY,
                session_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            INSERT OR REPLACE INTO schema_version VALUES (2);
            "#,
        )?;
        debug!("Applied store migration 2 (sessions)");
    }

    Ok(())
}

fn to_u32(value: i64, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        ProgressionError::Storage(format!("{} holds out-of-range value {}", column, value))
    })
}

/// Read a ledger, creating the all-zero row on first access
fn read_ledger(conn: &Connection, user: &str) -> Result<ProgressLedger> {
    conn.execute("INSERT OR IGNORE INTO ledgers (user_id) VALUES (?1)", [user])?;

    let (total, solved, without_hint, version): (i64, i64, i64, i64) = conn.query_row(
        "SELECT total_points, solved_count, solved_without_hint_count, version
         FROM ledgers WHERE user_id = ?1",
        [user],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )?;

    let mut ledger = ProgressLedger {
        total_points: to_u32(total, "total_points")?,
        solved_count: to_u32(solved, "solved_count")?,
        solved_without_hint_count: to_u32(without_hint, "solved_without_hint_count")?,
        version: u64::try_from(version).map_err(|_| {
            ProgressionError::Storage(format!("version holds negative value {}", version))
        })?,
        ..ProgressLedger::default()
    };

    let mut stmt =
        conn.prepare("SELECT topic_id, count FROM topic_progress WHERE user_id = ?1 AND count > 0")?;
    let rows = stmt.query_map([user], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?;
    for row in rows {
        let (topic, count) = row?;
        let topic = TopicId::from_i64(topic)
            .map_err(|e| ProgressionError::Storage(format!("corrupt topic row: {}", e)))?;
        ledger.topic_progress.insert(topic, to_u32(count, "count")?);
    }

    Ok(ledger)
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn load_ledger(&self, user: &UserId) -> Result<ProgressLedger> {
        let user = user.clone();
        self.with_conn(move |conn| read_ledger(conn, user.as_str()))
            .await
    }

    async fn apply_award(
        &self,
        user: &UserId,
        award: &Award,
        expected_version: u64,
    ) -> Result<ProgressLedger> {
        let user = user.clone();
        let award = award.clone();
        self.with_conn(move |conn| {
            let user = user.as_str();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute("INSERT OR IGNORE INTO ledgers (user_id) VALUES (?1)", [user])?;

            let changed = tx.execute(
                "UPDATE ledgers SET
                    total_points = total_points + ?1,
                    solved_count = solved_count + 1,
                    solved_without_hint_count = solved_without_hint_count + ?2,
                    version = version + 1,
                    updated_at = ?3
                 WHERE user_id = ?4 AND version = ?5",
                params![
                    award.points,
                    if award.hint_used { 0 } else { 1 },
                    Utc::now().timestamp_millis(),
                    user,
                    expected_version as i64,
                ],
            )?;

            if changed == 0 {
                let actual: i64 = tx.query_row(
                    "SELECT version FROM ledgers WHERE user_id = ?1",
                    [user],
                    |r| r.get(0),
                )?;
                // Dropping the transaction rolls it back
                return Err(ProgressionError::VersionConflict {
                    expected: expected_version,
                    actual: actual.max(0) as u64,
                });
            }

            for topic in &award.topics {
                tx.execute(
                    "INSERT INTO topic_progress (user_id, topic_id, count) VALUES (?1, ?2, 1)
                     ON CONFLICT(user_id, topic_id) DO UPDATE SET count = count + 1",
                    params![user, topic.get()],
                )?;
            }

            let ledger = read_ledger(&tx, user)?;
            tx.commit()?;
            Ok(ledger)
        })
        .await
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn load_session(&self, user: &UserId) -> Result<Option<SessionState>> {
        let user = user.clone();
        let json: Option<String> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT session_json FROM sessions WHERE user_id = ?1",
                        [user.as_str()],
                        |r| r.get(0),
                    )
                    .optional()?)
            })
            .await?;

        json.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| ProgressionError::Storage(format!("corrupt session row: {}", e)))
        })
        .transpose()
    }

    async fn save_session(&self, user: &UserId, session: &SessionState) -> Result<()> {
        let user = user.clone();
        let json = serde_json::to_string(session)
            .map_err(|e| ProgressionError::Storage(format!("Failed to encode session: {}", e)))?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO sessions (user_id, session_json, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET session_json = ?2, updated_at = ?3",
                params![user.as_str(), json, Utc::now().timestamp_millis()],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("sqlite-user").unwrap()
    }

    fn topics(ids: &[u8]) -> Vec<TopicId> {
        ids.iter().map(|&id| TopicId::new(id).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_first_access_creates_zero_ledger() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ledger = store.load_ledger(&user()).await.unwrap();
        assert_eq!(ledger, ProgressLedger::new());
    }

    #[tokio::test]
    async fn test_apply_award_increments() {
        let store = SqliteStore::open_in_memory().unwrap();
        let award = Award::for_solve(false, &topics(&[13, 7]));
        let ledger = store.apply_award(&user(), &award, 0).await.unwrap();

        assert_eq!(ledger.total_points, 3);
        assert_eq!(ledger.solved_count, 1);
        assert_eq!(ledger.solved_without_hint_count, 1);
        assert_eq!(ledger.topic_count(TopicId::new(13).unwrap()), 1);
        assert_eq!(ledger.topic_count(TopicId::new(7).unwrap()), 1);
        assert_eq!(ledger.version, 1);

        let hinted = Award::for_solve(true, &topics(&[7]));
        let ledger = store.apply_award(&user(), &hinted, 1).await.unwrap();
        assert_eq!(ledger.total_points, 4);
        assert_eq!(ledger.solved_without_hint_count, 1);
        assert_eq!(ledger.topic_count(TopicId::new(7).unwrap()), 2);
    }

    #[tokio::test]
    async fn test_conflict_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        let award = Award::for_solve(false, &topics(&[1]));
        store.apply_award(&user(), &award, 0).await.unwrap();

        let err = store.apply_award(&user(), &award, 0).await.unwrap_err();
        assert_eq!(err, ProgressionError::VersionConflict { expected: 0, actual: 1 });

        let ledger = store.load_ledger(&user()).await.unwrap();
        assert_eq!(ledger.total_points, 3);
        assert_eq!(ledger.topic_count(TopicId::new(1).unwrap()), 1);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = SqliteStore::open_in_memory().unwrap();
        let other = UserId::new("someone-else").unwrap();
        store
            .apply_award(&user(), &Award::for_solve(false, &topics(&[2])), 0)
            .await
            .unwrap();
        assert_eq!(store.load_ledger(&other).await.unwrap().total_points, 0);
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_session(&user()).await.unwrap().is_none());

        let mut session = SessionState::idle();
        session.id = "abc".to_string();
        session.hint_revealed = true;
        store.save_session(&user(), &session).await.unwrap();
        assert_eq!(store.load_session(&user()).await.unwrap(), Some(session));
    }
}
