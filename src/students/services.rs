use serde_json::{json, Value};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::debug;

use crate::students::error::StoreError;
use crate::students::password::{hash_password, verify_password};
use crate::students::repo_types::{NewStudent, ProgressRow, Student, StudentData};

/// Durable account and progress persistence. Owns the pool; constructed once
/// at startup and handed to the router through `AppState`.
#[derive(Clone)]
pub struct StudentStore {
    db: SqlitePool,
}

impl StudentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an account plus its empty progress row in one transaction, so
    /// a failure on either insert leaves nothing behind.
    pub async fn register(&self, new: NewStudent) -> Result<Student, StoreError> {
        let hash = hash_password(&new.password).map_err(StoreError::Hash)?;
        let now = OffsetDateTime::now_utc();

        let mut tx = self.db.begin().await?;
        let student = Student::create(
            &mut *tx,
            &new.username,
            &hash,
            new.email.as_deref(),
            new.full_name.as_deref(),
            now,
        )
        .await?;
        ProgressRow::create_empty(&mut *tx, student.id, now).await?;
        tx.commit().await?;

        debug!(student_id = student.id, username = %student.username, "student registered");
        Ok(student)
    }

    /// Exact-username lookup plus hash verification. The two failure kinds
    /// stay distinct here; collapsing them for clients is the handler's job.
    pub async fn login(&self, username: &str, password: &str) -> Result<Student, StoreError> {
        let student = Student::find_by_username(&self.db, username)
            .await?
            .ok_or(StoreError::NotFound)?;

        let ok = verify_password(password, &student.password_hash).map_err(StoreError::Hash)?;
        if !ok {
            return Err(StoreError::InvalidCredentials);
        }

        debug!(student_id = student.id, "login verified");
        Ok(student)
    }

    /// Whole-document upsert of a student's progress and plan. Absent parts
    /// are stored as empty defaults; anything previously saved is replaced.
    /// Returns the affected-row count, for diagnostics only.
    pub async fn save_data(
        &self,
        student_id: i64,
        progress: Option<Value>,
        study_plan: Option<Value>,
    ) -> Result<u64, StoreError> {
        let progress = serde_json::to_string(&progress.unwrap_or_else(|| json!({})))?;
        let study_plan = serde_json::to_string(&study_plan.unwrap_or_else(|| json!([])))?;
        let now = OffsetDateTime::now_utc();

        let rows = ProgressRow::upsert(&self.db, student_id, &progress, &study_plan, now).await?;
        debug!(student_id, rows, "progress saved");
        Ok(rows)
    }

    /// Fetch and decode a student's progress. When no row exists the empty
    /// defaults are synthesized with the current time and nothing is written.
    pub async fn load_data(&self, student_id: i64) -> Result<StudentData, StoreError> {
        match ProgressRow::find_by_student(&self.db, student_id).await? {
            Some(row) => Ok(StudentData {
                progress: serde_json::from_str(&row.progress_data)?,
                study_plan: serde_json::from_str(&row.study_plan)?,
                last_updated: row.last_updated,
            }),
            None => Ok(StudentData {
                progress: json!({}),
                study_plan: json!([]),
                last_updated: OffsetDateTime::now_utc(),
            }),
        }
    }

    pub async fn student_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(Student::find_by_id(&self.db, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> StudentStore {
        // One connection so every query sees the same in-memory database.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        schema::init(&db).await.expect("schema init");
        StudentStore::new(db)
    }

    fn alice() -> NewStudent {
        NewStudent {
            username: "alice".into(),
            password: "pw123".into(),
            email: None,
            full_name: None,
        }
    }

    async fn count(store: &StudentStore, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&store.db)
            .await
            .expect("count query")
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let store = memory_store().await;
        let created = store.register(alice()).await.expect("register");
        assert_eq!(created.id, 1);
        assert_eq!(created.username, "alice");
        assert_eq!(created.email, None);
        assert_eq!(created.full_name, None);

        let logged_in = store.login("alice", "pw123").await.expect("login");
        assert_eq!(logged_in.id, created.id);

        // The hash is stored but never serialized.
        assert!(logged_in.password_hash.starts_with("$argon2"));
        let json = serde_json::to_value(&logged_in).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[tokio::test]
    async fn register_creates_empty_progress_row() {
        let store = memory_store().await;
        let created = store.register(alice()).await.unwrap();
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM student_progress").await,
            1
        );

        let data = store.load_data(created.id).await.unwrap();
        assert_eq!(data.progress, json!({}));
        assert_eq!(data.study_plan, json!([]));
    }

    #[tokio::test]
    async fn duplicate_username_rejected_without_partial_insert() {
        let store = memory_store().await;
        store.register(alice()).await.unwrap();

        let mut second = alice();
        second.email = Some("other@example.com".into());
        let err = store.register(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        assert_eq!(count(&store, "SELECT COUNT(*) FROM students").await, 1);
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM student_progress").await,
            1
        );
    }

    #[tokio::test]
    async fn login_failures_keep_distinct_kinds() {
        let store = memory_store().await;
        store.register(alice()).await.unwrap();

        let err = store.login("nobody", "pw123").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(err.to_string(), "Student not found");

        let err = store.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
        assert_eq!(err.to_string(), "Invalid password");
    }

    #[tokio::test]
    async fn save_then_load_roundtrip() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;

        let progress = json!({"week1": true});
        let plan = json!([{"task": "read ch1"}]);
        let rows = store
            .save_data(id, Some(progress.clone()), Some(plan.clone()))
            .await
            .expect("save");
        assert_eq!(rows, 1);

        let data = store.load_data(id).await.expect("load");
        assert_eq!(data.progress, progress);
        assert_eq!(data.study_plan, plan);
    }

    #[tokio::test]
    async fn save_is_whole_document_replacement() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;

        store
            .save_data(id, Some(json!({"a": 1, "keep": true})), None)
            .await
            .unwrap();
        store.save_data(id, Some(json!({"b": 2})), None).await.unwrap();

        let data = store.load_data(id).await.unwrap();
        assert_eq!(data.progress, json!({"b": 2}));
        assert_eq!(data.study_plan, json!([]));

        // Still a single row per student after repeated saves.
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM student_progress").await,
            1
        );
    }

    #[tokio::test]
    async fn save_defaults_when_parts_absent() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;

        store.save_data(id, None, None).await.unwrap();
        let data = store.load_data(id).await.unwrap();
        assert_eq!(data.progress, json!({}));
        assert_eq!(data.study_plan, json!([]));
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;
        store
            .save_data(id, Some(json!({"week2": false})), Some(json!(["x"])))
            .await
            .unwrap();

        let first = store.load_data(id).await.unwrap();
        let second = store.load_data(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn load_unknown_student_synthesizes_defaults_without_writing() {
        let store = memory_store().await;
        let before = OffsetDateTime::now_utc();

        let data = store.load_data(999).await.expect("load");
        assert_eq!(data.progress, json!({}));
        assert_eq!(data.study_plan, json!([]));
        assert!(data.last_updated >= before);

        assert_eq!(
            count(
                &store,
                "SELECT COUNT(*) FROM student_progress WHERE student_id = 999"
            )
            .await,
            0
        );
    }

    #[tokio::test]
    async fn save_for_unknown_student_is_rejected() {
        // Referential integrity is enforced; no orphan progress rows.
        let store = memory_store().await;
        let err = store.save_data(42, None, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Db(_)));
        assert_eq!(
            count(&store, "SELECT COUNT(*) FROM student_progress").await,
            0
        );
    }

    #[tokio::test]
    async fn load_fails_on_corrupt_stored_document() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;
        sqlx::query("UPDATE student_progress SET progress_data = 'not json' WHERE student_id = ?1")
            .bind(id)
            .execute(&store.db)
            .await
            .unwrap();

        let err = store.load_data(id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn student_by_id_lookup() {
        let store = memory_store().await;
        let id = store.register(alice()).await.unwrap().id;

        let found = store.student_by_id(id).await.unwrap().expect("present");
        assert_eq!(found.username, "alice");
        assert!(store.student_by_id(id + 1).await.unwrap().is_none());
    }
}
