use rusqlite::{params, Connection, OptionalExtension, Row};

use learnforge_core::model::QuizRecord;

use crate::schema::now_iso8601;
use crate::{Result, Store, StoreError};

/// Fields for a new quiz. `questions` is the serialized question list.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub topic: String,
    pub questions: String,
    pub learning_path_id: Option<i64>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct QuizUpdate {
    pub title: Option<String>,
    pub topic: Option<String>,
    pub questions: Option<String>,
}

const QUIZ_COLUMNS: &str =
    "id, user_id, learning_path_id, title, topic, questions, created_at, updated_at";

fn row_to_quiz(row: &Row<'_>) -> rusqlite::Result<QuizRecord> {
    Ok(QuizRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        learning_path_id: row.get(2)?,
        title: row.get(3)?,
        topic: row.get(4)?,
        questions: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn fetch_quiz(conn: &Connection, user_id: i64, id: i64) -> Result<QuizRecord> {
    conn.query_row(
        &format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        row_to_quiz,
    )
    .optional()?
    .ok_or(StoreError::NotFound("quiz"))
}

impl Store {
    /// The user's quizzes, newest first.
    pub fn list_quizzes(&self, user_id: i64) -> Result<Vec<QuizRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
        ))?;
        let quizzes = stmt
            .query_map(params![user_id], row_to_quiz)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quizzes)
    }

    pub fn get_quiz(&self, user_id: i64, id: i64) -> Result<QuizRecord> {
        let conn = self.lock()?;
        fetch_quiz(&conn, user_id, id)
    }

    pub fn create_quiz(&self, user_id: i64, quiz: &NewQuiz) -> Result<QuizRecord> {
        let conn = self.lock()?;

        if let Some(path_id) = quiz.learning_path_id {
            let owned: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM learning_paths WHERE id = ?1 AND user_id = ?2)",
                params![path_id, user_id],
                |row| row.get(0),
            )?;
            if !owned {
                return Err(StoreError::NotFound("learning path"));
            }
        }

        let now = now_iso8601();
        conn.execute(
            "INSERT INTO quizzes (user_id, learning_path_id, title, topic, questions, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![user_id, quiz.learning_path_id, quiz.title, quiz.topic, quiz.questions, now],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(user_id, quiz_id = id, topic = %quiz.topic, "quiz created");
        fetch_quiz(&conn, user_id, id)
    }

    pub fn update_quiz(&self, user_id: i64, id: i64, update: &QuizUpdate) -> Result<QuizRecord> {
        let conn = self.lock()?;
        let current = fetch_quiz(&conn, user_id, id)?;

        conn.execute(
            "UPDATE quizzes SET title = ?1, topic = ?2, questions = ?3, updated_at = ?4 WHERE id = ?5 AND user_id = ?6",
            params![
                update.title.as_deref().unwrap_or(&current.title),
                update.topic.as_deref().unwrap_or(&current.topic),
                update.questions.as_deref().unwrap_or(&current.questions),
                now_iso8601(),
                id,
                user_id,
            ],
        )?;
        fetch_quiz(&conn, user_id, id)
    }

    pub fn delete_quiz(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM quizzes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(StoreError::NotFound("quiz"));
        }
        tracing::debug!(user_id, quiz_id = id, "quiz deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{second_user, store_with_user};

    fn new_quiz(title: &str) -> NewQuiz {
        NewQuiz {
            title: title.into(),
            topic: "rivers".into(),
            questions: r#"[{"question":"Q","options":["a","b","c","d"],"correctAnswer":"a"}]"#
                .into(),
            learning_path_id: None,
        }
    }

    #[test]
    fn create_get_list() {
        let (store, user) = store_with_user();
        let first = store.create_quiz(user, &new_quiz("first")).unwrap();
        let second = store.create_quiz(user, &new_quiz("second")).unwrap();

        assert_eq!(first.user_id, user);
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(first.parsed_questions().unwrap()[0].question, "Q");

        let fetched = store.get_quiz(user, first.id).unwrap();
        assert_eq!(fetched, first);

        let titles: Vec<String> = store
            .list_quizzes(user)
            .unwrap()
            .into_iter()
            .map(|q| q.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let (store, user) = store_with_user();
        let quiz = store.create_quiz(user, &new_quiz("old")).unwrap();

        let updated = store
            .update_quiz(
                user,
                quiz.id,
                &QuizUpdate {
                    title: Some("new".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.topic, quiz.topic);
        assert_eq!(updated.questions, quiz.questions);
    }

    #[test]
    fn other_users_cannot_see_or_touch() {
        let (store, user) = store_with_user();
        let other = second_user(&store);
        let quiz = store.create_quiz(user, &new_quiz("mine")).unwrap();

        assert!(store.get_quiz(other, quiz.id).unwrap_err().is_not_found());
        assert!(store
            .update_quiz(other, quiz.id, &QuizUpdate::default())
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_quiz(other, quiz.id).unwrap_err().is_not_found());
        assert!(store.list_quizzes(other).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_row() {
        let (store, user) = store_with_user();
        let quiz = store.create_quiz(user, &new_quiz("gone")).unwrap();
        store.delete_quiz(user, quiz.id).unwrap();
        assert!(store.get_quiz(user, quiz.id).unwrap_err().is_not_found());
        assert!(store.delete_quiz(user, quiz.id).unwrap_err().is_not_found());
    }

    #[test]
    fn unknown_learning_path_is_rejected() {
        let (store, user) = store_with_user();
        let mut quiz = new_quiz("linked");
        quiz.learning_path_id = Some(77);
        assert!(store.create_quiz(user, &quiz).unwrap_err().is_not_found());
    }
}
