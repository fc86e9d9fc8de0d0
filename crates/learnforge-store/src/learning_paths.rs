use rusqlite::{params, Connection, OptionalExtension, Row};

use learnforge_core::learning_path::LearningModule;
use learnforge_core::model::{LearningPathRecord, LearningPathStatus};

use crate::schema::now_iso8601;
use crate::{Result, Store, StoreError};

#[derive(Debug, Clone, Default)]
pub struct NewLearningPath {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub topic: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub status: LearningPathStatus,
    pub modules: Vec<LearningModule>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct LearningPathUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub status: Option<LearningPathStatus>,
    pub modules: Option<Vec<LearningModule>>,
}

const PATH_COLUMNS: &str = "id, user_id, title, description, content, topic, level, duration, status, modules, created_at, updated_at";

fn row_to_path(row: &Row<'_>) -> rusqlite::Result<LearningPathRecord> {
    let status: String = row.get(8)?;
    let modules: String = row.get(9)?;
    Ok(LearningPathRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        content: row.get(4)?,
        topic: row.get(5)?,
        level: row.get(6)?,
        duration: row.get(7)?,
        status: status.parse().unwrap_or_default(),
        modules: serde_json::from_str(&modules).unwrap_or_else(|e| {
            tracing::warn!("unreadable modules column: {e}");
            Vec::new()
        }),
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn fetch_path(conn: &Connection, user_id: i64, id: i64) -> Result<LearningPathRecord> {
    conn.query_row(
        &format!("SELECT {PATH_COLUMNS} FROM learning_paths WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        row_to_path,
    )
    .optional()?
    .ok_or(StoreError::NotFound("learning path"))
}

impl Store {
    /// The user's learning paths, newest first.
    pub fn list_learning_paths(&self, user_id: i64) -> Result<Vec<LearningPathRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PATH_COLUMNS} FROM learning_paths WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))?;
        let paths = stmt
            .query_map(params![user_id], row_to_path)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(paths)
    }

    pub fn get_learning_path(&self, user_id: i64, id: i64) -> Result<LearningPathRecord> {
        let conn = self.lock()?;
        fetch_path(&conn, user_id, id)
    }

    pub fn create_learning_path(
        &self,
        user_id: i64,
        path: &NewLearningPath,
    ) -> Result<LearningPathRecord> {
        let modules = serde_json::to_string(&path.modules)?;
        let conn = self.lock()?;
        let now = now_iso8601();
        conn.execute(
            "INSERT INTO learning_paths (user_id, title, description, content, topic, level, duration, status, modules, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                user_id,
                path.title,
                path.description,
                path.content,
                path.topic,
                path.level,
                path.duration,
                path.status.to_string(),
                modules,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, learning_path_id = id, modules = path.modules.len(), "learning path created");
        fetch_path(&conn, user_id, id)
    }

    pub fn update_learning_path(
        &self,
        user_id: i64,
        id: i64,
        update: &LearningPathUpdate,
    ) -> Result<LearningPathRecord> {
        let conn = self.lock()?;
        let current = fetch_path(&conn, user_id, id)?;

        let modules = match &update.modules {
            Some(modules) => serde_json::to_string(modules)?,
            None => serde_json::to_string(&current.modules)?,
        };

        conn.execute(
            "UPDATE learning_paths SET title = ?1, description = ?2, content = ?3, status = ?4, modules = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                update.title.as_deref().unwrap_or(&current.title),
                update.description.as_ref().or(current.description.as_ref()),
                update.content.as_ref().or(current.content.as_ref()),
                update.status.unwrap_or(current.status).to_string(),
                modules,
                now_iso8601(),
                id,
                user_id,
            ],
        )?;
        fetch_path(&conn, user_id, id)
    }

    /// Delete a path together with its progress rows; linked quizzes are kept.
    pub fn delete_learning_path(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM learning_paths WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound("learning path"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{second_user, store_with_user};
    use crate::NewQuiz;
    use learnforge_core::learning_path::outline_modules;

    fn new_path(title: &str) -> NewLearningPath {
        NewLearningPath {
            title: title.into(),
            topic: Some("Rust".into()),
            duration: Some("3-weeks".into()),
            modules: outline_modules("Rust", "3-weeks"),
            ..Default::default()
        }
    }

    #[test]
    fn create_round_trips_modules() {
        let (store, user) = store_with_user();
        let path = store.create_learning_path(user, &new_path("Learn Rust")).unwrap();

        assert_eq!(path.status, LearningPathStatus::Pending);
        assert_eq!(path.modules.len(), 3);
        assert_eq!(path.modules[0].title, "Week 1: Rust Fundamentals");
        assert_eq!(store.get_learning_path(user, path.id).unwrap(), path);
    }

    #[test]
    fn list_is_newest_first_and_scoped() {
        let (store, user) = store_with_user();
        let other = second_user(&store);
        store.create_learning_path(user, &new_path("a")).unwrap();
        store.create_learning_path(user, &new_path("b")).unwrap();
        store.create_learning_path(other, &new_path("c")).unwrap();

        let titles: Vec<String> = store
            .list_learning_paths(user)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["b", "a"]);
    }

    #[test]
    fn update_status_and_modules() {
        let (store, user) = store_with_user();
        let path = store.create_learning_path(user, &new_path("p")).unwrap();

        let mut modules = path.modules.clone();
        modules[0].completed = true;
        let updated = store
            .update_learning_path(
                user,
                path.id,
                &LearningPathUpdate {
                    status: Some(LearningPathStatus::Active),
                    modules: Some(modules),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.status, LearningPathStatus::Active);
        assert!(updated.modules[0].completed);
        assert_eq!(updated.title, "p");
        assert_eq!(updated.duration.as_deref(), Some("3-weeks"));
    }

    #[test]
    fn delete_keeps_quizzes_but_unlinks_them() {
        let (store, user) = store_with_user();
        let path = store.create_learning_path(user, &new_path("p")).unwrap();
        let quiz = store
            .create_quiz(
                user,
                &NewQuiz {
                    title: "q".into(),
                    topic: "t".into(),
                    questions: "[]".into(),
                    learning_path_id: Some(path.id),
                },
            )
            .unwrap();
        assert_eq!(quiz.learning_path_id, Some(path.id));

        store.delete_learning_path(user, path.id).unwrap();
        assert!(store.get_learning_path(user, path.id).unwrap_err().is_not_found());
        assert_eq!(store.get_quiz(user, quiz.id).unwrap().learning_path_id, None);
    }

    #[test]
    fn other_user_cannot_delete() {
        let (store, user) = store_with_user();
        let other = second_user(&store);
        let path = store.create_learning_path(user, &new_path("p")).unwrap();
        assert!(store.delete_learning_path(other, path.id).unwrap_err().is_not_found());
    }
}
