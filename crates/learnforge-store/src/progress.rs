use rusqlite::{params, OptionalExtension, Row};

use learnforge_core::model::{LearningPathSummary, ProgressRecord};

use crate::schema::now_iso8601;
use crate::{Result, Store, StoreError};

const PROGRESS_COLUMNS: &str =
    "p.id, p.user_id, p.learning_path_id, p.module, p.completion, p.created_at, p.updated_at";

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<ProgressRecord> {
    Ok(ProgressRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        learning_path_id: row.get(2)?,
        module: row.get(3)?,
        completion: row.get(4)?,
        learning_path: None,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Store {
    /// Record completion for one module, replacing any earlier value.
    ///
    /// The learning path must belong to the user.
    pub fn upsert_progress(
        &self,
        user_id: i64,
        learning_path_id: i64,
        module: &str,
        completion: f64,
    ) -> Result<ProgressRecord> {
        let conn = self.lock()?;

        let owned: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM learning_paths WHERE id = ?1 AND user_id = ?2)",
            params![learning_path_id, user_id],
            |row| row.get(0),
        )?;
        if !owned {
            return Err(StoreError::NotFound("learning path"));
        }

        let now = now_iso8601();
        conn.execute(
            "INSERT INTO progress (user_id, learning_path_id, module, completion, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (user_id, learning_path_id, module)
             DO UPDATE SET completion = excluded.completion, updated_at = excluded.updated_at",
            params![user_id, learning_path_id, module, completion, now],
        )?;

        let record = conn.query_row(
            &format!(
                "SELECT {PROGRESS_COLUMNS} FROM progress p
                 WHERE p.user_id = ?1 AND p.learning_path_id = ?2 AND p.module = ?3"
            ),
            params![user_id, learning_path_id, module],
            row_to_progress,
        )?;
        tracing::debug!(user_id, learning_path_id, %module, completion, "progress saved");
        Ok(record)
    }

    /// Progress rows for one path, by module name.
    pub fn list_progress_for_path(
        &self,
        user_id: i64,
        learning_path_id: i64,
    ) -> Result<Vec<ProgressRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress p
             WHERE p.user_id = ?1 AND p.learning_path_id = ?2
             ORDER BY p.module ASC"
        ))?;
        let rows = stmt
            .query_map(params![user_id, learning_path_id], row_to_progress)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All of the user's progress, most recently updated first, with the
    /// title and description of each path.
    pub fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROGRESS_COLUMNS}, lp.title, lp.description FROM progress p
             JOIN learning_paths lp ON lp.id = p.learning_path_id
             WHERE p.user_id = ?1
             ORDER BY p.updated_at DESC, p.id DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                let mut record = row_to_progress(row)?;
                record.learning_path = Some(LearningPathSummary {
                    title: row.get(7)?,
                    description: row.get(8)?,
                });
                Ok(record)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn delete_progress(&self, user_id: i64, learning_path_id: i64, module: &str) -> Result<()> {
        let conn = self.lock()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM progress WHERE user_id = ?1 AND learning_path_id = ?2 AND module = ?3",
                params![user_id, learning_path_id, module],
                |row| row.get(0),
            )
            .optional()?;
        let Some(id) = existing else {
            return Err(StoreError::NotFound("progress"));
        };
        conn.execute("DELETE FROM progress WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{second_user, store_with_user};
    use crate::NewLearningPath;

    fn path(store: &Store, user: i64, title: &str) -> i64 {
        store
            .create_learning_path(
                user,
                &NewLearningPath {
                    title: title.into(),
                    description: Some(format!("{title} description")),
                    ..Default::default()
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn upsert_replaces_completion() {
        let (store, user) = store_with_user();
        let p = path(&store, user, "Rust");

        let first = store.upsert_progress(user, p, "Week 1", 25.0).unwrap();
        let second = store.upsert_progress(user, p, "Week 1", 80.0).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.completion, 80.0);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.list_progress_for_path(user, p).unwrap().len(), 1);
    }

    #[test]
    fn per_path_list_is_sorted_by_module() {
        let (store, user) = store_with_user();
        let p = path(&store, user, "Rust");
        store.upsert_progress(user, p, "b-module", 10.0).unwrap();
        store.upsert_progress(user, p, "a-module", 20.0).unwrap();

        let modules: Vec<String> = store
            .list_progress_for_path(user, p)
            .unwrap()
            .into_iter()
            .map(|r| r.module)
            .collect();
        assert_eq!(modules, vec!["a-module", "b-module"]);
    }

    #[test]
    fn full_list_includes_path_summary() {
        let (store, user) = store_with_user();
        let p = path(&store, user, "Rust");
        store.upsert_progress(user, p, "m", 50.0).unwrap();

        let all = store.list_progress(user).unwrap();
        assert_eq!(all.len(), 1);
        let summary = all[0].learning_path.as_ref().unwrap();
        assert_eq!(summary.title, "Rust");
        assert_eq!(summary.description.as_deref(), Some("Rust description"));
    }

    #[test]
    fn foreign_path_is_not_found() {
        let (store, user) = store_with_user();
        let other = second_user(&store);
        let p = path(&store, other, "theirs");
        assert!(store.upsert_progress(user, p, "m", 1.0).unwrap_err().is_not_found());
        assert!(store.upsert_progress(user, 404, "m", 1.0).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_progress_row() {
        let (store, user) = store_with_user();
        let p = path(&store, user, "Rust");
        store.upsert_progress(user, p, "m", 50.0).unwrap();

        store.delete_progress(user, p, "m").unwrap();
        assert!(store.list_progress_for_path(user, p).unwrap().is_empty());
        assert!(store.delete_progress(user, p, "m").unwrap_err().is_not_found());
    }

    #[test]
    fn deleting_path_removes_progress() {
        let (store, user) = store_with_user();
        let p = path(&store, user, "Rust");
        store.upsert_progress(user, p, "m", 50.0).unwrap();
        store.delete_learning_path(user, p).unwrap();
        assert!(store.list_progress(user).unwrap().is_empty());
    }
}
