//! Driven port for file storage addressed by path.

use async_trait::async_trait;
use url::Url;

use crate::domain::{BlobPath, FileUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The backing storage could not be reached.
        Unavailable { message: String } =>
            "blob store unavailable: {message}",
        /// A read or write failed.
        Storage { message: String } =>
            "blob store operation failed: {message}",
        /// No blob exists at the path.
        NotFound { path: String } =>
            "blob {path} does not exist",
    }
}

/// Stored blob content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// Media type recorded at upload.
    pub content_type: Option<String>,
}

/// Port for storing files and handing out retrieval URLs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store content at `path`, replacing any previous blob, and return its URL.
    async fn put(&self, path: &BlobPath, upload: FileUpload) -> Result<Url, BlobStoreError>;

    /// URL of an existing blob.
    async fn url(&self, path: &BlobPath) -> Result<Url, BlobStoreError>;

    /// Read a blob, `None` when absent.
    async fn get(&self, path: &BlobPath) -> Result<Option<StoredBlob>, BlobStoreError>;

    /// Remove an existing blob.
    async fn delete(&self, path: &BlobPath) -> Result<(), BlobStoreError>;
}
