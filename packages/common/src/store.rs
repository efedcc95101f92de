//! # Document Store
//!
//! Collection + id addressed JSON documents with partial updates and simple
//! equality/order queries. Writes are last-write-wins; there is no version
//! check on update.

use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Equality filters plus an optional ordering
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, SortDirection)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Check whether a document satisfies every equality filter
    pub fn matches(&self, data: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }

    /// Filter and sort a candidate set
    pub fn apply(&self, docs: Vec<StoredDocument>) -> Vec<StoredDocument> {
        let mut matched: Vec<StoredDocument> =
            docs.into_iter().filter(|d| self.matches(&d.data)).collect();

        // Ties fall back to id so results are deterministic
        matched.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some((field, direction)) = &self.order_by {
            matched.sort_by(|a, b| {
                let ord = compare_values(
                    a.data.get(field).unwrap_or(&Value::Null),
                    b.data.get(field).unwrap_or(&Value::Null),
                );
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        matched
    }
}

/// A document together with its id, as returned by queries
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
}

/// Remote document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document; `None` when no record has this id
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Write a full document under a caller-chosen id (overwrites)
    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<()>;

    /// Merge top-level fields into an existing document
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()>;

    /// Delete a document; deleting a missing id is not an error
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>>;
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON scalars used for `order_by`
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn merge_fields(target: &mut Value, fields: Map<String, Value>) {
    match target {
        Value::Object(existing) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        other => *other = Value::Object(fields),
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory store with write-failure injection
///
/// Every `create`, `update_fields` and `delete` call counts as a write
/// attempt, whether or not it succeeds.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    failing_writes: AtomicUsize,
    unavailable: AtomicBool,
    write_attempts: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` write attempts with a transient error
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, AtomicOrdering::SeqCst);
    }

    /// Reject every call (reads included) until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(AtomicOrdering::SeqCst)
    }

    /// Seed a document without counting a write
    pub fn insert(&self, collection: &str, id: &str, data: Value) {
        if let Ok(mut collections) = self.collections.lock() {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), data);
        }
    }

    /// Peek at a stored document without going through the async API
    pub fn document(&self, collection: &str, id: &str) -> Option<Value> {
        let collections = self.collections.lock().ok()?;
        collections.get(collection)?.get(id).cloned()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, BTreeMap<String, Value>>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn begin_write(&self) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, AtomicOrdering::SeqCst);
        self.check_available()?;

        let injected = self
            .failing_writes
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();

        if injected {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.check_available()?;
        let collections = self.lock()?;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        self.begin_write()?;
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        self.begin_write()?;
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_fields(doc, fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.begin_write()?;
        let mut collections = self.lock()?;
        if let Some(c) = collections.get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>> {
        self.check_available()?;
        let docs = {
            let collections = self.lock()?;
            collections
                .get(collection)
                .map(|c| {
                    c.iter()
                        .map(|(id, data)| StoredDocument {
                            id: id.clone(),
                            data: data.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        Ok(query.apply(docs))
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Store keeping one pretty-printed JSON file per document at
/// `<root>/<collection>/<id>.json`
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> StoreResult<PathBuf> {
        validate_key(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    async fn read(&self, path: &Path) -> StoreResult<Option<Value>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &Path, data: &Value) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file first so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_string_pretty(data)?).await?;
        tokio::fs::rename(&tmp, path).await?;

        tracing::debug!(path = %path.display(), "wrote document");
        Ok(())
    }
}

/// Keys become path segments, so only a conservative character set is allowed
fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let path = self.document_path(collection, id)?;
        self.read(&path).await
    }

    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        let path = self.document_path(collection, id)?;
        self.write(&path, &data).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let path = self.document_path(collection, id)?;
        let mut doc = self
            .read(&path)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_fields(&mut doc, fields);
        self.write(&path, &doc).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let path = self.document_path(collection, id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<StoredDocument>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let id = match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) => stem.to_string(),
                    None => continue,
                };
                match self.read(&path).await {
                    Ok(Some(data)) => docs.push(StoredDocument { id, data }),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    }
                }
            }
        }

        Ok(query.apply(docs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        store
            .create("pages", "p1", json!({"title": "A", "ownerId": "u1"}))
            .await
            .unwrap();

        store
            .update_fields("pages", "p1", fields(json!({"title": "B"})))
            .await
            .unwrap();

        let doc = store.get("pages", "p1").await.unwrap().unwrap();
        assert_eq!(doc["title"], "B");
        assert_eq!(doc["ownerId"], "u1");
        assert_eq!(store.write_attempts(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update_fields("pages", "missing", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let store = MemoryDocumentStore::new();
        store.fail_next_writes(2);

        assert!(store.create("pages", "p1", json!({})).await.is_err());
        assert!(store.create("pages", "p1", json!({})).await.is_err());
        assert!(store.create("pages", "p1", json!({})).await.is_ok());
        assert_eq!(store.write_attempts(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_reads() {
        let store = MemoryDocumentStore::new();
        store.insert("pages", "p1", json!({}));
        store.set_unavailable(true);

        let err = store.get("pages", "p1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let store = MemoryDocumentStore::new();
        store.insert("pages", "a", json!({"ownerId": "u1", "updatedAt": 10}));
        store.insert("pages", "b", json!({"ownerId": "u2", "updatedAt": 30}));
        store.insert("pages", "c", json!({"ownerId": "u1", "updatedAt": 20}));

        let query = Query::new()
            .where_eq("ownerId", "u1")
            .order_by("updatedAt", SortDirection::Descending);
        let results = store.query("pages", &query).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path());

        store
            .create("pages", "home", json!({"ownerId": "u1", "updatedAt": 1}))
            .await
            .unwrap();
        store
            .update_fields("pages", "home", fields(json!({"updatedAt": 2})))
            .await
            .unwrap();

        let doc = store.get("pages", "home").await.unwrap().unwrap();
        assert_eq!(doc["updatedAt"], 2);

        let listed = store
            .query("pages", &Query::new().where_eq("ownerId", "u1"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        store.delete("pages", "home").await.unwrap();
        assert!(store.get("pages", "home").await.unwrap().is_none());
        // Second delete is a no-op
        store.delete("pages", "home").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path());

        let err = store.get("pages", "../escape").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
