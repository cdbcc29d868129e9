//! Driven port for the hierarchical document database.
//!
//! Adapters store schemaless field maps addressed by [`DocumentPath`]. The
//! port deliberately offers only what the dashboard needs: point reads,
//! filtered and ordered collection queries with keyset continuation,
//! field-level merges and a single all-or-nothing batch.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    CollectionPath, Document, DocumentId, DocumentPath, FieldMap, FieldPath, FieldUpdate,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
        /// An update targeted a document that does not exist.
        NotFound { path: String } =>
            "document {path} does not exist",
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Ordering of a collection query. Ties break on the document id in the
/// same direction, so the order is total.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Field to sort on; missing fields sort as `null`.
    pub field: FieldPath,
    /// Sort direction.
    pub direction: Direction,
}

/// Keyset continuation: only documents strictly after this position in the
/// query order are returned.
#[derive(Debug, Clone, PartialEq)]
pub struct StartAfter {
    /// Sort field value of the last seen document.
    pub value: Value,
    /// Identifier of the last seen document.
    pub id: DocumentId,
}

/// Query over the documents of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    /// Collection to read.
    pub collection: CollectionPath,
    /// Top-level field equality filters, all of which must match.
    pub filters: Vec<(String, Value)>,
    /// Optional ordering; unordered queries return documents by id.
    pub order_by: Option<OrderBy>,
    /// Continuation position; requires `order_by`.
    pub start_after: Option<StartAfter>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl DocumentQuery {
    /// Query every document of a collection.
    pub fn collection(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    /// Require `field == value`.
    #[must_use]
    pub fn where_eq(mut self, field: &str, value: Value) -> Self {
        self.filters.push((field.to_owned(), value));
        self
    }

    /// Order results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: FieldPath, direction: Direction) -> Self {
        self.order_by = Some(OrderBy { field, direction });
        self
    }

    /// Continue after a previously returned document.
    #[must_use]
    pub fn start_after(mut self, value: Value, id: DocumentId) -> Self {
        self.start_after = Some(StartAfter { value, id });
        self
    }

    /// Limit the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    /// Create or overwrite the document.
    Set {
        /// Target document.
        path: DocumentPath,
        /// Complete field map.
        fields: FieldMap,
    },
    /// Merge field updates into an existing document.
    Update {
        /// Target document.
        path: DocumentPath,
        /// Updates applied in order.
        updates: Vec<FieldUpdate>,
    },
    /// Remove the document if present.
    Delete {
        /// Target document.
        path: DocumentPath,
    },
}

/// Writes committed together: either every write lands or none does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<BatchWrite>,
}

impl WriteBatch {
    /// Start an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an overwrite.
    pub fn set(&mut self, path: DocumentPath, fields: FieldMap) -> &mut Self {
        self.writes.push(BatchWrite::Set { path, fields });
        self
    }

    /// Queue a merge.
    pub fn update(&mut self, path: DocumentPath, updates: Vec<FieldUpdate>) -> &mut Self {
        self.writes.push(BatchWrite::Update { path, updates });
        self
    }

    /// Queue a removal.
    pub fn delete(&mut self, path: DocumentPath) -> &mut Self {
        self.writes.push(BatchWrite::Delete { path });
        self
    }

    /// Queued writes in order.
    pub fn writes(&self) -> &[BatchWrite] {
        &self.writes
    }

    /// Consume the batch.
    pub fn into_writes(self) -> Vec<BatchWrite> {
        self.writes
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Port for reading and writing documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError>;

    /// Run a collection query.
    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError>;

    /// Insert a document under a generated identifier.
    async fn create(
        &self,
        collection: &CollectionPath,
        fields: FieldMap,
    ) -> Result<DocumentId, DocumentStoreError>;

    /// Create or overwrite a document.
    async fn set(&self, path: &DocumentPath, fields: FieldMap) -> Result<(), DocumentStoreError>;

    /// Merge field updates into an existing document.
    ///
    /// Fails with [`DocumentStoreError::NotFound`] when the document is absent.
    async fn update(
        &self,
        path: &DocumentPath,
        updates: &[FieldUpdate],
    ) -> Result<(), DocumentStoreError>;

    /// Remove a document. Removing an absent document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError>;

    /// Commit a batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), DocumentStoreError>;
}
