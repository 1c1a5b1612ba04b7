use std::sync::Arc;

use crate::config::AppConfig;
use crate::entities::{AuditLog, Category, Order, Product, StoredUser};
use crate::store::{EntityStore, KeyValue, MemoryStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KeyValue>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let kv: Arc<dyn KeyValue> = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url).await?),
            None => {
                tracing::warn!("DATABASE_URL not set; records will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self { kv, config })
    }

    pub fn from_parts(kv: Arc<dyn KeyValue>, config: Arc<AppConfig>) -> Self {
        Self { kv, config }
    }

    /// In-memory state for unit tests.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
        });
        Self {
            kv: Arc::new(MemoryStore::new()),
            config,
        }
    }

    pub fn products(&self) -> EntityStore<Product> {
        EntityStore::new(self.kv.clone())
    }

    pub fn categories(&self) -> EntityStore<Category> {
        EntityStore::new(self.kv.clone())
    }

    pub fn users(&self) -> EntityStore<StoredUser> {
        EntityStore::new(self.kv.clone())
    }

    pub fn orders(&self) -> EntityStore<Order> {
        EntityStore::new(self.kv.clone())
    }

    pub fn audit(&self) -> EntityStore<AuditLog> {
        EntityStore::new(self.kv.clone())
    }
}
