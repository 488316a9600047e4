use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::RecordError;

/// Persists the outcome of a completed session for a user.
pub trait SessionRecorder {
    fn record(&mut self, user: &str, speed_wpm: f64, accuracy: f64) -> Result<(), RecordError>;
}

/// A stored session result
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub username: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub recorded_at: DateTime<Local>,
}

/// Session history backed by sqlite
#[derive(Debug)]
pub struct SqliteRecorder {
    conn: Connection,
}

impl SqliteRecorder {
    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, RecordError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, RecordError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS typing_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                wpm REAL NOT NULL,
                accuracy REAL NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_typing_sessions_user ON typing_sessions(username)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// All sessions for `username`, oldest first
    pub fn sessions_for_user(&self, username: &str) -> Result<Vec<SessionRecord>, RecordError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT username, wpm, accuracy, recorded_at
            FROM typing_sessions
            WHERE username = ?1
            ORDER BY recorded_at ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([username], |row| {
            let recorded_at: String = row.get(3)?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        3,
                        "recorded_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionRecord {
                username: row.get(0)?,
                wpm: row.get(1)?,
                accuracy: row.get(2)?,
                recorded_at,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Best net wpm recorded for `username`, if any
    pub fn best_wpm(&self, username: &str) -> Result<Option<f64>, RecordError> {
        let best = self.conn.query_row(
            "SELECT MAX(wpm) FROM typing_sessions WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;
        Ok(best)
    }
}

impl SessionRecorder for SqliteRecorder {
    fn record(&mut self, user: &str, speed_wpm: f64, accuracy: f64) -> Result<(), RecordError> {
        self.conn.execute(
            r#"
            INSERT INTO typing_sessions (username, wpm, accuracy, recorded_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![user, speed_wpm, accuracy, Local::now().to_rfc3339()],
        )?;
        tracing::debug!(user, speed_wpm, accuracy, "session recorded");
        Ok(())
    }
}
