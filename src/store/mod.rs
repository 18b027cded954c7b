//! # Store Layer
//!
//! Durable persistence behind the `KvStore` trait: string-keyed records
//! (string-to-string maps) and string sets, the two shapes the reminders
//! feature needs. Two backends: an in-memory DashMap store for tests and
//! local development, and the sqlite store the running bot uses.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Extracted trait from the sqlite-only implementation

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Hash/set operations the reminders feature requires of its backing
/// store. Key layout is the caller's concern; the store treats keys as
/// opaque strings.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Add `member` to the set at `key`. Adding an existing member is a
    /// no-op.
    async fn add_to_set(&self, key: &str, member: &str) -> Result<()>;

    /// Remove `member` from the set at `key`. Removing a missing member is
    /// a no-op.
    async fn remove_from_set(&self, key: &str, member: &str) -> Result<()>;

    /// Whether the set at `key` exists (has at least one member).
    async fn set_exists(&self, key: &str) -> Result<bool>;

    /// All members of the set at `key`; empty for a missing set.
    async fn members_of(&self, key: &str) -> Result<Vec<String>>;

    /// The record at `key`, if present.
    async fn get_record(&self, key: &str) -> Result<Option<HashMap<String, String>>>;

    /// Write the record at `key`, replacing any existing one.
    async fn put_record(&self, key: &str, fields: HashMap<String, String>) -> Result<()>;

    /// Delete the record at `key`. Deleting a missing record is a no-op.
    async fn delete_record(&self, key: &str) -> Result<()>;
}
