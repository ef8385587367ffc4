use sqlx::SqliteExecutor;
use time::OffsetDateTime;

use crate::students::repo_types::{ProgressRow, Student};

impl Student {
    /// Insert a new account row. The UNIQUE constraint on username is the
    /// only duplicate check.
    pub async fn create(
        db: impl SqliteExecutor<'_>,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        full_name: Option<&str>,
        created_at: OffsetDateTime,
    ) -> sqlx::Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (username, password_hash, email, full_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, username, password_hash, email, full_name, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(full_name)
        .bind(created_at)
        .fetch_one(db)
        .await?;
        Ok(student)
    }

    /// Find an account by exact username.
    pub async fn find_by_username(
        db: impl SqliteExecutor<'_>,
        username: &str,
    ) -> sqlx::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, username, password_hash, email, full_name, created_at
            FROM students
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }

    pub async fn find_by_id(
        db: impl SqliteExecutor<'_>,
        id: i64,
    ) -> sqlx::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, username, password_hash, email, full_name, created_at
            FROM students
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }
}

impl ProgressRow {
    /// Seed the empty progress row created alongside a new account.
    pub async fn create_empty(
        db: impl SqliteExecutor<'_>,
        student_id: i64,
        now: OffsetDateTime,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO student_progress (student_id, last_updated)
            VALUES (?1, ?2)
            "#,
        )
        .bind(student_id)
        .bind(now)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Insert-or-replace keyed by student_id. Whole-document replacement,
    /// never a merge.
    pub async fn upsert(
        db: impl SqliteExecutor<'_>,
        student_id: i64,
        progress_data: &str,
        study_plan: &str,
        now: OffsetDateTime,
    ) -> sqlx::Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO student_progress (student_id, progress_data, study_plan, last_updated)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (student_id) DO UPDATE SET
                progress_data = excluded.progress_data,
                study_plan = excluded.study_plan,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(student_id)
        .bind(progress_data)
        .bind(study_plan)
        .bind(now)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_student(
        db: impl SqliteExecutor<'_>,
        student_id: i64,
    ) -> sqlx::Result<Option<ProgressRow>> {
        let row = sqlx::query_as::<_, ProgressRow>(
            r#"
            SELECT student_id, progress_data, study_plan, last_updated
            FROM student_progress
            WHERE student_id = ?1
            "#,
        )
        .bind(student_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}
