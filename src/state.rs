use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;

use crate::config::AppConfig;
use crate::students::{schema, services::StudentStore};

#[derive(Clone)]
pub struct AppState {
    pub store: StudentStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        schema::init(&db).await.context("initialize schema")?;
        Ok(Self {
            store: StudentStore::new(db),
            config,
        })
    }
}
