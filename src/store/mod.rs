//! Persistence collaborator: a document key-value store organized into named
//! collections. The core only reads and writes whole documents; any query
//! beyond get-by-id is a full-collection scan filtered in application code.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

pub const USERS: &str = "users";
pub const ROOMS: &str = "rooms";
pub const MATCHES: &str = "matches";
pub const TOURNAMENT_ROOMS: &str = "tournament-rooms";

/// Sub-collection holding the score audit log of one tournament room.
pub fn tournament_match_log(room_id: &str) -> String {
    format!("{}/{}/matches", TOURNAMENT_ROOMS, room_id)
}

/// Errors surfaced by the store. No automatic retry: the caller's document
/// stays at its last successfully persisted state.
#[derive(Clone, Debug)]
pub enum StoreError {
    /// The backing storage could not be accessed.
    Unavailable(String),
    /// A document could not be (de)serialized.
    Codec(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StoreError::Codec(msg) => write!(f, "Document encoding error: {}", msg),
        }
    }
}

/// Whole-document reads and writes over named collections.
pub trait DocumentStore: Send + Sync {
    fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
    fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
    fn write(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;
    fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Read and decode one document, `None` when absent.
pub fn read_doc<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.read(collection, id)? {
        Some(v) => serde_json::from_value(v)
            .map(Some)
            .map_err(|e| StoreError::Codec(e.to_string())),
        None => Ok(None),
    }
}

/// Read and decode a whole collection. Documents that fail to decode are
/// skipped with a warning rather than failing the scan.
pub fn read_all_docs<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for v in store.read_all(collection)? {
        match serde_json::from_value(v) {
            Ok(doc) => out.push(doc),
            Err(e) => log::warn!("skipping undecodable document in {}: {}", collection, e),
        }
    }
    Ok(out)
}

/// Encode and write one document.
pub fn write_doc<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<(), StoreError> {
    let v = serde_json::to_value(doc).map_err(|e| StoreError::Codec(e.to_string()))?;
    store.write(collection, id, v)
}

/// In-memory store used by the web binary and tests. Collections are keyed
/// maps of JSON documents behind one lock; each write replaces the whole
/// document (last write wins).
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let g = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(g.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn read_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let g = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        Ok(g.get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    fn write(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut g = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        g.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut g = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))?;
        if let Some(c) = g.get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }
}
