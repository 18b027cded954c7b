//! In-memory store backend
//!
//! DashMap-backed `KvStore` used by tests and as a throwaway dev backend.
//! Nothing survives the process.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};

use super::KvStore;

#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, HashMap<String, String>>,
    sets: DashMap<String, HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn add_to_set(&self, key: &str, member: &str) -> Result<()> {
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<()> {
        if let Some(mut set) = self.sets.get_mut(key) {
            set.remove(member);
            let empty = set.is_empty();
            drop(set);
            // An empty set does not exist, matching set_exists.
            if empty {
                self.sets.remove_if(key, |_, s| s.is_empty());
            }
        }
        Ok(())
    }

    async fn set_exists(&self, key: &str) -> Result<bool> {
        Ok(self.sets.get(key).map_or(false, |s| !s.is_empty()))
    }

    async fn members_of(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_record(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn put_record(&self, key: &str, fields: HashMap<String, String>) -> Result<()> {
        self.records.insert(key.to_string(), fields);
        Ok(())
    }

    async fn delete_record(&self, key: &str) -> Result<()> {
        self.records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_membership() {
        let store = MemoryStore::new();
        store.add_to_set("s", "a").await.unwrap();
        store.add_to_set("s", "b").await.unwrap();
        store.add_to_set("s", "a").await.unwrap();

        let mut members = store.members_of("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);
        assert!(store.set_exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_set_does_not_exist() {
        let store = MemoryStore::new();
        assert!(!store.set_exists("s").await.unwrap());

        store.add_to_set("s", "a").await.unwrap();
        store.remove_from_set("s", "a").await.unwrap();
        assert!(!store.set_exists("s").await.unwrap());
        assert!(store.members_of("s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_member_is_noop() {
        let store = MemoryStore::new();
        store.remove_from_set("s", "ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_record_lifecycle() {
        let store = MemoryStore::new();
        assert!(store.get_record("k").await.unwrap().is_none());

        let fields = HashMap::from([("a".to_string(), "1".to_string())]);
        store.put_record("k", fields.clone()).await.unwrap();
        assert_eq!(store.get_record("k").await.unwrap(), Some(fields));

        store.delete_record("k").await.unwrap();
        assert!(store.get_record("k").await.unwrap().is_none());
        // Deleting again is fine.
        store.delete_record("k").await.unwrap();
    }
}
