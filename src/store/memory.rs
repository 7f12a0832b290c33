//! # In-Memory Document Store
//!
//! Collections of JSON documents behind a single `RwLock`, optionally loaded
//! from and saved to a JSON file mapping collection names to document arrays.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use uuid::Uuid;

use super::document::{Document, Filter, FindOptions, ID_FIELD};
use super::errors::{StoreError, StoreResult};
use super::DocumentStore;

/// In-memory collection-per-role store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given collections
    pub fn with_collections(collections: HashMap<String, Vec<Document>>) -> Self {
        Self {
            collections: Arc::new(RwLock::new(collections)),
        }
    }

    /// Load a store from a JSON file
    pub fn load_json(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| StoreError::malformed(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_value(value)?;

        tracing::info!(
            path = %path.display(),
            collections = store.collection_names()?.len(),
            "loaded document store"
        );
        Ok(store)
    }

    /// Build a store from `{collection: [documents...]}`
    pub fn from_value(value: Value) -> StoreResult<Self> {
        let Value::Object(root) = value else {
            return Err(StoreError::malformed(
                "top level must be an object of collections",
            ));
        };

        let store = Self::new();
        for (name, docs) in root {
            let Value::Array(items) = docs else {
                return Err(StoreError::malformed(format!(
                    "collection '{}' must be an array",
                    name
                )));
            };
            let mut parsed = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(doc) => parsed.push(doc),
                    other => {
                        return Err(StoreError::malformed(format!(
                            "collection '{}' holds a non-object entry: {}",
                            name, other
                        )))
                    }
                }
            }
            store.insert_many(&name, parsed)?;
        }
        Ok(store)
    }

    /// Write the store to a JSON file
    pub fn save_json(&self, path: &Path) -> StoreResult<()> {
        let snapshot = self.snapshot()?;
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::malformed(e.to_string()))?;
        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append documents to a collection, assigning `_id` where missing
    pub fn insert_many(&self, collection: &str, docs: Vec<Document>) -> StoreResult<usize> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;
        let target = collections.entry(collection.to_string()).or_default();

        let count = docs.len();
        for mut doc in docs {
            if !doc.contains_key(ID_FIELD) {
                doc.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
            }
            target.push(doc);
        }
        Ok(count)
    }

    /// Rewrite every document of every collection in place
    pub fn update_each<F>(&self, mut f: F) -> StoreResult<usize>
    where
        F: FnMut(&str, &mut Document) -> StoreResult<bool>,
    {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;
        let mut changed = 0;
        for (name, docs) in collections.iter_mut() {
            for doc in docs.iter_mut() {
                if f(name, doc)? {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Copy of all collections, ordered by name
    pub fn snapshot(&self) -> StoreResult<BTreeMap<String, Vec<Document>>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;
        Ok(collections
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl DocumentStore for MemoryStore {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;

        let mut matched: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();
        drop(collections);

        options.apply_sort(&mut matched);
        Ok(matched
            .iter()
            .map(|d| options.apply_projection(d))
            .collect())
    }

    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    fn ping(&self) -> StoreResult<()> {
        self.collections
            .read()
            .map(|_| ())
            .map_err(|_| StoreError::LockPoisoned("collections"))
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("collections"))?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
