use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::kv::KeyValue;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists for key {0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A persisted record type. `storage_key` is the single point of per-type
/// polymorphism: most entities key on their `id`, the user entity keys on
/// lowercased email.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Record-key prefix, e.g. `product` → `product:{key}`.
    const KIND: &'static str;

    /// Name of the index list enumerating live keys, e.g. `products`.
    const INDEX: &'static str;

    fn storage_key(&self) -> String;

    /// Fixtures written the first time `ensure_seed` sees an empty index.
    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

/// Generic CRUD + enumeration over one entity kind. Each record lives in its
/// own key-value slot; a side index list per kind makes `list` possible
/// without a full scan.
pub struct EntityStore<E: Entity> {
    kv: Arc<dyn KeyValue>,
    _marker: PhantomData<E>,
}

impl<E: Entity> EntityStore<E> {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self {
            kv,
            _marker: PhantomData,
        }
    }

    fn record_key(key: &str) -> String {
        format!("{}:{}", E::KIND, key)
    }

    fn index_key() -> String {
        format!("index:{}", E::INDEX)
    }

    async fn read_index(&self) -> Result<Vec<String>, StoreError> {
        match self.kv.get(&Self::index_key()).await? {
            Some(value) => Ok(serde_json::from_value(value).map_err(anyhow::Error::from)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, keys: &[String]) -> Result<(), StoreError> {
        self.kv.put(&Self::index_key(), json!(keys)).await?;
        Ok(())
    }

    /// Absence is not exceptional: missing records read as `false`.
    pub async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.kv.get(&Self::record_key(key)).await?.is_some())
    }

    /// Absence is not exceptional: missing records read as `None`. Stored
    /// fields the type no longer knows fall back to serde defaults.
    pub async fn get(&self, key: &str) -> Result<Option<E>, StoreError> {
        match self.kv.get(&Self::record_key(key)).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(anyhow::Error::from)?,
            )),
            None => Ok(None),
        }
    }

    /// Writes a new record under its derived key and registers the key in the
    /// index list. The exists check and the write are separate reads/writes;
    /// callers own check-then-create races.
    pub async fn create(&self, state: &E) -> Result<E, StoreError> {
        let key = state.storage_key();
        if self.exists(&key).await? {
            return Err(StoreError::Conflict(key));
        }
        let value = serde_json::to_value(state).map_err(anyhow::Error::from)?;
        self.kv.put(&Self::record_key(&key), value).await?;

        let mut index = self.read_index().await?;
        if !index.iter().any(|k| k == &key) {
            index.push(key);
            self.write_index(&index).await?;
        }
        Ok(state.clone())
    }

    /// Shallow-merges top-level fields of `partial` into the stored record.
    /// Patching with `{}` is a no-op.
    pub async fn patch(&self, key: &str, partial: &Value) -> Result<E, StoreError> {
        let stored = self
            .kv
            .get(&Self::record_key(key))
            .await?
            .ok_or(StoreError::NotFound)?;
        let merged = shallow_merge(stored, partial);
        let record: E = serde_json::from_value(merged.clone())
            .map_err(|e| StoreError::Invalid(format!("invalid patch for {}: {e}", E::KIND)))?;
        self.kv.put(&Self::record_key(key), merged).await?;
        Ok(record)
    }

    /// Removes the record and its index entry. Deleting an absent key
    /// succeeds silently.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.kv.delete(&Self::record_key(key)).await?;
        let index = self.read_index().await?;
        if index.iter().any(|k| k == key) {
            let remaining: Vec<String> = index.into_iter().filter(|k| k != key).collect();
            self.write_index(&remaining).await?;
        }
        Ok(())
    }

    /// Reads the index list, then every referenced record. Dangling index
    /// entries are skipped.
    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        let index = self.read_index().await?;
        let mut items = Vec::with_capacity(index.len());
        for key in index {
            if let Some(item) = self.get(&key).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Populates the store from the entity's fixtures when the index list is
    /// empty or missing. A second call sees a non-empty index and no-ops.
    pub async fn ensure_seed(&self) -> Result<(), StoreError> {
        if !self.read_index().await?.is_empty() {
            return Ok(());
        }
        let mut index = Vec::new();
        for item in E::seed() {
            let key = item.storage_key();
            let value = serde_json::to_value(&item).map_err(anyhow::Error::from)?;
            self.kv.put(&Self::record_key(&key), value).await?;
            index.push(key);
        }
        if !index.is_empty() {
            self.write_index(&index).await?;
        }
        Ok(())
    }
}

fn shallow_merge(mut stored: Value, partial: &Value) -> Value {
    if let (Value::Object(base), Value::Object(overlay)) = (&mut stored, partial) {
        for (field, value) in overlay {
            base.insert(field.clone(), value.clone());
        }
    }
    stored
}
