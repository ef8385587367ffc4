use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::students::repo_types::{PublicStudent, Student, StudentData};

/// Request body for registration. Field names match the original client
/// payload (`full_name` stays snake_case).
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for saving progress. Clients send `studentId` as either a
/// JSON number or a numeric string; both coerce to the account's integer id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDataRequest {
    #[serde(default, deserialize_with = "student_id_opt")]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub study_plan: Option<Value>,
}

fn student_id_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom("studentId must be an integer")),
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub student: PublicStudent,
}

/// Login also returns the student's current progress and plan, saving the
/// client a follow-up fetch.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub student: Student,
    pub progress: Value,
    #[serde(rename = "studyPlan")]
    pub study_plan: Value,
}

#[derive(Debug, Serialize)]
pub struct SaveDataResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoadDataResponse {
    pub success: bool,
    pub data: StudentData,
}
