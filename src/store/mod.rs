//! Persistent section memory backed by `SQLite`.

mod error;
mod memory;
mod schema;

pub use error::StoreError;
pub use memory::{normalize_title, MemoryHandle, MemoryRecord, MemoryStore, Upsert};
pub use schema::{table_name, TABLE_PREFIX};
