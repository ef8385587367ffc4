/// Failure modes of the student store. Missing-field validation is the
/// caller's job and never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Student not found")]
    NotFound,
    #[error("Invalid password")]
    InvalidCredentials,
    #[error("username already exists")]
    Duplicate,
    #[error("malformed stored document: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("password hashing failed: {0}")]
    Hash(anyhow::Error),
    #[error(transparent)]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Db(err),
        }
    }
}

impl StoreError {
    /// True for the two login failures. Handlers collapse both into one
    /// 401 response so clients cannot probe which usernames exist.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, StoreError::NotFound | StoreError::InvalidCredentials)
    }
}
