//! In-memory document store
//!
//! Keeps every document in a process-local map guarded by a
//! `tokio::sync::RwLock`. Insertion order is tracked with a sequence number
//! so queries return documents in the same order the Postgres backend does.
//! Nothing survives a restart.

use super::{
    generate_id, Collection, Document, DocumentStore, DocumentWrite, Fields, Filter, SetMode,
    StoreError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
struct StoredDocument {
    seq: u64,
    data: Fields,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<(Collection, String), StoredDocument>,
    next_seq: u64,
}

impl MemoryState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Document store backed by a process-local map
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: Collection) -> usize {
        let state = self.state.read().await;
        state
            .documents
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;

        Ok(state
            .documents
            .get(&(collection, id.to_string()))
            .map(|stored| Document {
                collection,
                id: id.to_string(),
                data: stored.data.clone(),
            }))
    }

    async fn set(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
        mode: SetMode,
    ) -> Result<Document, StoreError> {
        let now = Utc::now();
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let key = (collection, id.to_string());

        let data = if let Some(existing) = state.documents.get_mut(&key) {
            match mode {
                SetMode::Merge => existing.data.extend(write.resolve(now, false)),
                SetMode::Overwrite => existing.data = write.resolve(now, true),
            }
            existing.data.clone()
        } else {
            let data = write.resolve(now, true);
            let seq = state.next_seq();
            state.documents.insert(
                key,
                StoredDocument {
                    seq,
                    data: data.clone(),
                },
            );
            data
        };

        debug!(%collection, id, ?mode, "Document written");
        Ok(Document {
            collection,
            id: id.to_string(),
            data,
        })
    }

    async fn add(&self, collection: Collection, write: DocumentWrite) -> Result<Document, StoreError> {
        let id = generate_id();
        let data = write.resolve(Utc::now(), true);

        let mut state = self.state.write().await;
        let seq = state.next_seq();
        state.documents.insert(
            (collection, id.clone()),
            StoredDocument {
                seq,
                data: data.clone(),
            },
        );

        debug!(%collection, %id, "Document added");
        Ok(Document {
            collection,
            id,
            data,
        })
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;

        let mut matches: Vec<(u64, Document)> = state
            .documents
            .iter()
            .filter(|((c, _), stored)| {
                *c == collection && filters.iter().all(|f| f.matches(&stored.data))
            })
            .map(|((_, id), stored)| {
                (
                    stored.seq,
                    Document {
                        collection,
                        id: id.clone(),
                        data: stored.data.clone(),
                    },
                )
            })
            .collect();
        matches.sort_by_key(|(seq, _)| *seq);

        Ok(matches.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
