//! Blob storage adapters and the URL scheme they share.
//!
//! Every blob is served by the HTTP adapter at `{public_base_url}blobs/{path}`,
//! so adapters only need to agree on how a [`BlobPath`] becomes a URL.

mod filesystem;

pub use filesystem::FilesystemBlobStore;

use url::Url;

use crate::domain::BlobPath;
use crate::domain::ports::BlobStoreError;

/// Route prefix under which blobs are served.
pub const BLOB_ROUTE_PREFIX: &str = "blobs";

/// Builds public URLs for stored blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrls {
    base: Url,
}

impl BlobUrls {
    /// Use `base` as the public origin of the service.
    ///
    /// # Errors
    /// Fails when the base URL cannot carry path segments (e.g. `mailto:`).
    pub fn new(base: Url) -> Result<Self, BlobStoreError> {
        if base.cannot_be_a_base() {
            return Err(BlobStoreError::storage(format!(
                "public base URL {base} cannot carry a path"
            )));
        }
        Ok(Self { base })
    }

    /// Public URL of `path`.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::{BlobPath, FileName};
    /// use classdesk::outbound::blob::BlobUrls;
    /// use url::Url;
    ///
    /// let urls = BlobUrls::new(Url::parse("http://localhost:8080/").expect("url"))
    ///     .expect("base");
    /// let path = BlobPath::loose_file(&FileName::new("notes 1.pdf").expect("name"));
    /// assert_eq!(
    ///     urls.url_for(&path).expect("url").as_str(),
    ///     "http://localhost:8080/blobs/files/notes%201.pdf"
    /// );
    /// ```
    ///
    /// # Errors
    /// Never fails for a base accepted by [`BlobUrls::new`].
    pub fn url_for(&self, path: &BlobPath) -> Result<Url, BlobStoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BlobStoreError::storage("public base URL cannot carry a path"))?
            .pop_if_empty()
            .push(BLOB_ROUTE_PREFIX)
            .extend(path.segments());
        Ok(url)
    }
}
