//! Opaque cursor and page envelope primitives for keyset pagination.
//!
//! Endpoints hand clients a [`Cursor`] token that references the last row of
//! the page they just served. The token is URL-safe base64 over a JSON
//! encoding of the keyset key, so clients cannot depend on its shape and the
//! server can change the key layout without breaking the wire contract.
//!
//! ```
//! use pagination::Cursor;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Key {
//!     timestamp: i64,
//!     id: String,
//! }
//!
//! let token = Cursor::new(Key { timestamp: 7, id: "row".to_owned() })
//!     .encode()
//!     .expect("encode cursor");
//! let decoded: Cursor<Key> = Cursor::decode(&token).expect("decode cursor");
//! assert_eq!(decoded.into_inner().id, "row");
//! ```

mod envelope;

pub use envelope::{Paginated, PaginationLinks};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Page size used when the client does not ask for one.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 100;

/// Errors raised while encoding or decoding cursor tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    InvalidBase64 {
        /// Decoder diagnostic.
        message: String,
    },
    /// The decoded bytes do not describe the expected key.
    #[error("cursor payload is malformed: {message}")]
    InvalidPayload {
        /// Deserialiser diagnostic.
        message: String,
    },
    /// The key could not be serialised.
    #[error("cursor key could not be encoded: {message}")]
    Encode {
        /// Serialiser diagnostic.
        message: String,
    },
}

/// Opaque keyset cursor wrapping the key of the last row served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a keyset key.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Unwrap the key.
    pub fn into_inner(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the cursor as an opaque URL-safe token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encode`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(&self.key).map_err(|err| CursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token previously produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidBase64`] or
    /// [`CursorError::InvalidPayload`] when the token was tampered with or
    /// belongs to a different key layout.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| CursorError::InvalidBase64 {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::InvalidPayload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}

/// Errors raised while validating page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// A limit of zero was requested.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Client-supplied page parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct PageParams {
    /// Opaque cursor returned by the previous page.
    pub cursor: Option<String>,
    /// Requested page size.
    pub limit: Option<usize>,
}

impl PageParams {
    /// Build parameters from parts.
    pub fn new(cursor: Option<String>, limit: Option<usize>) -> Self {
        Self { cursor, limit }
    }

    /// Resolve the effective page size, clamping to [`MAX_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`PageParamsError::ZeroLimit`] when the client asked for an
    /// empty page.
    pub fn limit(&self) -> Result<usize, PageParamsError> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(0) => Err(PageParamsError::ZeroLimit),
            Some(limit) => Ok(limit.min(MAX_LIMIT)),
        }
    }

    /// Cursor token with blank values treated as absent.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
