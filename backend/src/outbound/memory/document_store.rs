//! In-process document store.
//!
//! Collections are keyed by their slash-joined path; documents within a
//! collection are kept sorted by id, which is also the order of unordered
//! queries. Batches are staged against a copy of the state and swapped in
//! only when every write succeeded.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::ports::{
    BatchWrite, Direction, DocumentQuery, DocumentStore, DocumentStoreError, OrderBy, WriteBatch,
};
use crate::domain::{
    CollectionPath, Document, DocumentId, DocumentPath, FieldMap, FieldUpdate, apply_updates,
    compare_values, field_at,
};

type Collections = BTreeMap<String, BTreeMap<DocumentId, FieldMap>>;

/// Document store held in memory behind an async lock.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filters(fields: &FieldMap, filters: &[(String, Value)]) -> bool {
    filters
        .iter()
        .all(|(name, expected)| fields.get(name) == Some(expected))
}

fn sort_value<'a>(document: &'a Document, order: &OrderBy) -> &'a Value {
    field_at(&document.fields, &order.field).unwrap_or(&Value::Null)
}

fn compare_position(
    left: (&Value, &DocumentId),
    right: (&Value, &DocumentId),
    direction: Direction,
) -> Ordering {
    let ascending = compare_values(left.0, right.0).then_with(|| left.1.cmp(right.1));
    match direction {
        Direction::Ascending => ascending,
        Direction::Descending => ascending.reverse(),
    }
}

fn run_query(collections: &Collections, query: &DocumentQuery) -> Vec<Document> {
    let Some(documents) = collections.get(&query.collection.to_string()) else {
        return Vec::new();
    };
    let mut found: Vec<Document> = documents
        .iter()
        .filter(|(_, fields)| matches_filters(fields, &query.filters))
        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
        .collect();

    match &query.order_by {
        Some(order) => {
            found.sort_by(|left, right| {
                compare_position(
                    (sort_value(left, order), &left.id),
                    (sort_value(right, order), &right.id),
                    order.direction,
                )
            });
            if let Some(cursor) = &query.start_after {
                found.retain(|document| {
                    compare_position(
                        (sort_value(document, order), &document.id),
                        (&cursor.value, &cursor.id),
                        order.direction,
                    ) == Ordering::Greater
                });
            }
        }
        None => {
            if let Some(cursor) = &query.start_after {
                found.retain(|document| document.id > cursor.id);
            }
        }
    }

    if let Some(limit) = query.limit {
        found.truncate(limit);
    }
    found
}

fn merge_into(
    collections: &mut Collections,
    path: &DocumentPath,
    updates: &[FieldUpdate],
) -> Result<(), DocumentStoreError> {
    let fields = collections
        .get_mut(&path.collection().to_string())
        .and_then(|documents| documents.get_mut(path.id()))
        .ok_or_else(|| DocumentStoreError::not_found(path.to_string()))?;
    apply_updates(fields, updates);
    Ok(())
}

fn write_into(collections: &mut Collections, path: &DocumentPath, fields: FieldMap) {
    collections
        .entry(path.collection().to_string())
        .or_default()
        .insert(path.id().clone(), fields);
}

fn remove_from(collections: &mut Collections, path: &DocumentPath) {
    let key = path.collection().to_string();
    if let Some(documents) = collections.get_mut(&key) {
        documents.remove(path.id());
        if documents.is_empty() {
            collections.remove(&key);
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.collection().to_string())
            .and_then(|documents| documents.get(path.id()))
            .map(|fields| Document::new(path.id().clone(), fields.clone())))
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError> {
        let collections = self.collections.read().await;
        Ok(run_query(&collections, query))
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        fields: FieldMap,
    ) -> Result<DocumentId, DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        let mut id = DocumentId::generate();
        while documents.contains_key(&id) {
            id = DocumentId::generate();
        }
        documents.insert(id.clone(), fields);
        Ok(id)
    }

    async fn set(&self, path: &DocumentPath, fields: FieldMap) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        write_into(&mut collections, path, fields);
        Ok(())
    }

    async fn update(
        &self,
        path: &DocumentPath,
        updates: &[FieldUpdate],
    ) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        merge_into(&mut collections, path, updates)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        remove_from(&mut collections, path);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let mut staged = collections.clone();
        for write in batch.into_writes() {
            match write {
                BatchWrite::Set { path, fields } => write_into(&mut staged, &path, fields),
                BatchWrite::Update { path, updates } => merge_into(&mut staged, &path, &updates)?,
                BatchWrite::Delete { path } => remove_from(&mut staged, &path),
            }
        }
        *collections = staged;
        Ok(())
    }
}
