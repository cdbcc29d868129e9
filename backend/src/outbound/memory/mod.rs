//! In-memory adapters for local runs and tests.

mod blob_store;
mod document_store;

pub use blob_store::InMemoryBlobStore;
pub use document_store::InMemoryDocumentStore;
