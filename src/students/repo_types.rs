use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Student account row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 hash, never exposed in JSON
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Public part of a student account, as returned by registration.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStudent {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl From<Student> for PublicStudent {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            username: s.username,
            email: s.email,
            full_name: s.full_name,
        }
    }
}

/// Raw progress row; `progress_data` and `study_plan` hold JSON text the
/// store never inspects.
#[derive(Debug, Clone, FromRow)]
pub struct ProgressRow {
    pub student_id: i64,
    pub progress_data: String,
    pub study_plan: String,
    pub last_updated: OffsetDateTime,
}

/// Decoded progress view handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentData {
    pub progress: serde_json::Value,
    #[serde(rename = "studyPlan")]
    pub study_plan: serde_json::Value,
    #[serde(rename = "lastUpdated", with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

/// Input to registration. The password is still plaintext here; hashing
/// happens inside the store.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}
