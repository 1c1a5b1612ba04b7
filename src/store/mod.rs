mod entity;
mod kv;
mod postgres;

pub use entity::{Entity, EntityStore, StoreError};
pub use kv::{KeyValue, MemoryStore};
pub use postgres::PgStore;
