//! learnforge-store: SQLite persistence.
//!
//! A [`Store`] owns one connection behind a mutex. Every quiz, learning path
//! and progress operation takes the owning user's id and never touches rows
//! that belong to someone else; a row owned by another user is reported as
//! [`StoreError::NotFound`].

mod error;
mod learning_paths;
mod progress;
mod quizzes;
mod schema;
mod users;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

pub use error::StoreError;
pub use learning_paths::{LearningPathUpdate, NewLearningPath};
pub use quizzes::{NewQuiz, QuizUpdate};
pub use users::{NewUser, UserCredentials};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the database. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = schema::open_file(path)?;
        schema::init_schema(&conn)?;
        tracing::info!(path = %path.display(), version = schema::SCHEMA_VERSION, "database ready");
        Ok(Self::from_connection(conn))
    }

    /// A private in-memory database, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = schema::open_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use learnforge_core::model::Role;

    use crate::{NewUser, Store};

    pub fn store_with_user() -> (Store, i64) {
        let store = Store::open_in_memory().unwrap();
        let user = store
            .create_user(&NewUser {
                username: "ada".into(),
                email: "ada@example.com".into(),
                password_hash: Some("hash".into()),
                role: Role::Student,
            })
            .unwrap();
        (store, user.id)
    }

    pub fn second_user(store: &Store) -> i64 {
        store
            .create_user(&NewUser {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password_hash: None,
                role: Role::Instructor,
            })
            .unwrap()
            .id
    }
}
