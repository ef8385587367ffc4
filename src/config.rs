use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        // mode=rwc creates the database file on first run, matching the
        // sqlite3 default behaviour the original deployment relied on.
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://students.db?mode=rwc".into());
        Ok(Self { database_url })
    }
}
