use sqlx::SqlitePool;

/// Idempotent table bootstrap, run once at startup.
///
/// `student_progress.student_id` is UNIQUE so the save-data upsert is keyed
/// by it; ON DELETE CASCADE removes the progress row with its account.
/// Timestamps are TEXT and always bound from Rust so a single format
/// round-trips through sqlx.
pub async fn init(db: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email         TEXT,
            full_name     TEXT,
            created_at    TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_progress (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id    INTEGER NOT NULL UNIQUE REFERENCES students(id) ON DELETE CASCADE,
            progress_data TEXT NOT NULL DEFAULT '{}',
            study_plan    TEXT NOT NULL DEFAULT '[]',
            last_updated  TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}
