use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::db::{BloodBankStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BloodBankStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Reads the environment, connects to Postgres and applies migrations.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run database migrations")?;
        tracing::info!("database connected");

        Ok(Self::from_parts(Arc::new(PgStore::new(db)), config))
    }

    pub fn from_parts(store: Arc<dyn BloodBankStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }
}
