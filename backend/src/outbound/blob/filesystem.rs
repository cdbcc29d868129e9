//! Filesystem blob store confined to one directory with `cap-std`.
//!
//! Layout under the root:
//! - `data/{path}` holds the bytes;
//! - `meta/{path}` holds the media type, when one was supplied;
//! - `.staging/` receives uploads before they are renamed into place.
//!
//! All filesystem calls run on the blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use url::Url;
use uuid::Uuid;

use super::BlobUrls;
use crate::domain::ports::{BlobStore, BlobStoreError, StoredBlob};
use crate::domain::{BlobPath, FileUpload};

const DATA_DIR: &str = "data";
const META_DIR: &str = "meta";
const STAGING_DIR: &str = ".staging";

/// Blob store writing beneath a capability-scoped root directory.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: Arc<Dir>,
    urls: BlobUrls,
}

impl FilesystemBlobStore {
    /// Open (creating if needed) the store rooted at `root`.
    ///
    /// # Errors
    /// Returns [`BlobStoreError::Unavailable`] when the directory cannot be
    /// created or opened.
    pub fn open(root: &Path, urls: BlobUrls) -> Result<Self, BlobStoreError> {
        let unavailable =
            |error: io::Error| BlobStoreError::unavailable(format!("{}: {error}", root.display()));
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(unavailable)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(unavailable)?;
        for sub in [DATA_DIR, META_DIR, STAGING_DIR] {
            dir.create_dir_all(sub).map_err(unavailable)?;
        }
        Ok(Self {
            root: Arc::new(dir),
            urls,
        })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, BlobStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, BlobStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || work(&root))
            .await
            .map_err(|error| BlobStoreError::storage(format!("blob task failed: {error}")))?
    }
}

fn under(prefix: &str, path: &BlobPath) -> PathBuf {
    let mut relative = PathBuf::from(prefix);
    relative.extend(path.segments());
    relative
}

fn storage_error(path: &BlobPath, error: &io::Error) -> BlobStoreError {
    BlobStoreError::storage(format!("{path}: {error}"))
}

fn ensure_parent(dir: &Dir, relative: &Path, path: &BlobPath) -> Result<(), BlobStoreError> {
    match relative.parent() {
        Some(parent) => dir
            .create_dir_all(parent)
            .map_err(|error| storage_error(path, &error)),
        None => Ok(()),
    }
}

fn write_blob(dir: &Dir, path: &BlobPath, upload: FileUpload) -> Result<(), BlobStoreError> {
    let data = under(DATA_DIR, path);
    let meta = under(META_DIR, path);
    ensure_parent(dir, &data, path)?;
    ensure_parent(dir, &meta, path)?;

    let staged = PathBuf::from(STAGING_DIR).join(Uuid::new_v4().simple().to_string());
    dir.write(&staged, &upload.bytes)
        .map_err(|error| storage_error(path, &error))?;
    if let Err(error) = dir.rename(&staged, dir, &data) {
        if let Err(cleanup) = dir.remove_file(&staged) {
            warn!(blob = %path, error = %cleanup, "failed to remove staged upload");
        }
        return Err(storage_error(path, &error));
    }

    match upload.content_type {
        Some(content_type) => dir
            .write(&meta, content_type.as_bytes())
            .map_err(|error| storage_error(path, &error)),
        None => remove_if_exists(dir, &meta, path),
    }
}

fn remove_if_exists(dir: &Dir, relative: &Path, path: &BlobPath) -> Result<(), BlobStoreError> {
    match dir.remove_file(relative) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(storage_error(path, &error)),
    }
}

fn read_blob(dir: &Dir, path: &BlobPath) -> Result<Option<StoredBlob>, BlobStoreError> {
    let bytes = match dir.read(under(DATA_DIR, path)) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(storage_error(path, &error)),
    };
    let content_type = match dir.read_to_string(under(META_DIR, path)) {
        Ok(text) => Some(text),
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) => return Err(storage_error(path, &error)),
    };
    Ok(Some(StoredBlob {
        bytes,
        content_type,
    }))
}

fn blob_exists(dir: &Dir, path: &BlobPath) -> Result<bool, BlobStoreError> {
    dir.try_exists(under(DATA_DIR, path))
        .map_err(|error| storage_error(path, &error))
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &BlobPath, upload: FileUpload) -> Result<Url, BlobStoreError> {
        let url = self.urls.url_for(path)?;
        let target = path.clone();
        self.blocking(move |dir| write_blob(dir, &target, upload))
            .await?;
        Ok(url)
    }

    async fn url(&self, path: &BlobPath) -> Result<Url, BlobStoreError> {
        let target = path.clone();
        if !self.blocking(move |dir| blob_exists(dir, &target)).await? {
            return Err(BlobStoreError::not_found(path.to_string()));
        }
        self.urls.url_for(path)
    }

    async fn get(&self, path: &BlobPath) -> Result<Option<StoredBlob>, BlobStoreError> {
        let target = path.clone();
        self.blocking(move |dir| read_blob(dir, &target)).await
    }

    async fn delete(&self, path: &BlobPath) -> Result<(), BlobStoreError> {
        let target = path.clone();
        self.blocking(move |dir| {
            match dir.remove_file(under(DATA_DIR, &target)) {
                Ok(()) => {}
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    return Err(BlobStoreError::not_found(target.to_string()));
                }
                Err(error) => return Err(storage_error(&target, &error)),
            }
            remove_if_exists(dir, &under(META_DIR, &target), &target)
        })
        .await
    }
}
