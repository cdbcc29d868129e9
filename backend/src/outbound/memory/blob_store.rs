//! In-process blob store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::domain::ports::{BlobStore, BlobStoreError, StoredBlob};
use crate::domain::{BlobPath, FileUpload};
use crate::outbound::blob::BlobUrls;

/// Blob store held in memory; URLs point at the service's `/blobs` route.
#[derive(Debug)]
pub struct InMemoryBlobStore {
    urls: BlobUrls,
    blobs: RwLock<BTreeMap<BlobPath, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Create an empty store handing out URLs built by `urls`.
    pub fn new(urls: BlobUrls) -> Self {
        Self {
            urls,
            blobs: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &BlobPath, upload: FileUpload) -> Result<Url, BlobStoreError> {
        let url = self.urls.url_for(path)?;
        self.blobs.write().await.insert(
            path.clone(),
            StoredBlob {
                bytes: upload.bytes,
                content_type: upload.content_type,
            },
        );
        Ok(url)
    }

    async fn url(&self, path: &BlobPath) -> Result<Url, BlobStoreError> {
        if !self.blobs.read().await.contains_key(path) {
            return Err(BlobStoreError::not_found(path.to_string()));
        }
        self.urls.url_for(path)
    }

    async fn get(&self, path: &BlobPath) -> Result<Option<StoredBlob>, BlobStoreError> {
        Ok(self.blobs.read().await.get(path).cloned())
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), BlobStoreError> {
        self.blobs
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::not_found(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::FileName;

    fn store() -> InMemoryBlobStore {
        InMemoryBlobStore::new(
            BlobUrls::new(Url::parse("http://localhost:8080/").expect("url")).expect("base"),
        )
    }

    fn path() -> BlobPath {
        BlobPath::loose_file(&FileName::new("worksheet.pdf").expect("name"))
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_url_agree() {
        let blobs = store();
        let stored = blobs
            .put(
                &path(),
                FileUpload {
                    bytes: b"%PDF".to_vec(),
                    content_type: Some("application/pdf".to_owned()),
                },
            )
            .await
            .expect("put");
        assert_eq!(blobs.url(&path()).await.expect("url"), stored);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_absent_blob_is_not_found() {
        let err = store().delete(&path()).await.expect_err("absent");
        assert!(matches!(err, BlobStoreError::NotFound { .. }));
    }
}
