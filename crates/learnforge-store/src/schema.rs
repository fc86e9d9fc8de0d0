//! Connection setup and schema DDL.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

/// Schema version stored in `PRAGMA user_version`.
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Create all tables on a freshly opened connection.
///
/// Quizzes outlive the learning path they were generated for (the link is
/// cleared); progress rows are removed with their path.
pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            role TEXT NOT NULL DEFAULT 'student',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS learning_paths (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            content TEXT,
            topic TEXT,
            level TEXT,
            duration TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            modules TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quizzes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            learning_path_id INTEGER REFERENCES learning_paths(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            topic TEXT NOT NULL,
            questions TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            learning_path_id INTEGER NOT NULL REFERENCES learning_paths(id) ON DELETE CASCADE,
            module TEXT NOT NULL,
            completion REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, learning_path_id, module)
        );

        CREATE INDEX IF NOT EXISTS idx_quizzes_user ON quizzes(user_id);
        CREATE INDEX IF NOT EXISTS idx_learning_paths_user ON learning_paths(user_id);
        CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user_id);

        PRAGMA user_version = 1;
        ",
    )
}

/// Apply connection pragmas: WAL journal, foreign keys, 5 s busy timeout.
pub(crate) fn configure(conn: &Connection, file_backed: bool) -> rusqlite::Result<()> {
    if file_backed {
        conn.pragma_update(None, "journal_mode", "WAL")?;
    }
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    Ok(())
}

pub(crate) fn open_file(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn, true)?;
    Ok(conn)
}

pub(crate) fn open_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn, false)?;
    Ok(conn)
}

/// Current UTC time as RFC 3339 with millisecond precision,
/// e.g. `"2025-04-01T12:00:00.123Z"`.
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
