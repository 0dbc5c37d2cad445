use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::ai::AiClient;
use crate::config::AppConfig;
use crate::db;
use crate::storage::{LocalStorage, StorageClient};
use crate::weather::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub ai: Arc<AiClient>,
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = db::connect(&config.database_url).await?;
        let storage =
            Arc::new(LocalStorage::new(&config.upload_dir).await?) as Arc<dyn StorageClient>;
        let ai = Arc::new(AiClient::from_config(&config.ai)?);
        let weather = Arc::new(WeatherClient::new(&config.weather)?);

        info!(
            database = %config.database_url,
            uploads = %config.upload_dir.display(),
            model = %config.ai.model,
            ai_keys = ai.credential_count(),
            "state initialised"
        );

        Ok(Self::from_parts(db, config, storage, ai, weather))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
        ai: Arc<AiClient>,
        weather: Arc<WeatherClient>,
    ) -> Self {
        Self {
            db,
            config,
            storage,
            ai,
            weather,
        }
    }
}
