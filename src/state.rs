use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{MemoryStore, Store, StoreClient};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(Store::connect(&config).await?) as Arc<dyn StoreClient>;
        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn StoreClient>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// State over an empty in-memory store, for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            db_user: "test".into(),
            db_pass: "test".into(),
            db_host: "localhost".into(),
            db_name: "ibos".into(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self {
            store: Arc::new(MemoryStore::default()),
            config,
        }
    }
}
