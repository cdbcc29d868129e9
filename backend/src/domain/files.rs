//! File names, blob paths and file references.
//!
//! Two blob layouts coexist: files attached to a homework live under the
//! homework's document path, loose files live under `files/`. Both are
//! modelled by [`BlobPath`] so neither layout is privileged.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::library::HomeworkKey;

/// Prefix of the flat upload layout.
pub const LOOSE_FILES_PREFIX: &str = "files";

/// Validation failures for file names and blob paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileNameError {
    /// The name is empty or blank.
    #[error("file name must not be empty")]
    Empty,
    /// The name contains a path separator or control character.
    #[error("file name `{name}` must not contain separators or control characters")]
    ForbiddenCharacter { name: String },
    /// The name is a relative path component.
    #[error("file name `{name}` is reserved")]
    Reserved { name: String },
}

/// Name of a stored file, used as the final blob path segment.
///
/// ## Invariants
/// - non-empty once trimmed;
/// - no `/`, `\` or control characters (including NUL);
/// - not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Validate a file name.
    ///
    /// # Examples
    /// ```
    /// use classdesk::domain::FileName;
    ///
    /// assert!(FileName::new("worksheet.pdf").is_ok());
    /// assert!(FileName::new("../etc/passwd").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, FileNameError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FileNameError::Empty);
        }
        if name == "." || name == ".." {
            return Err(FileNameError::Reserved { name });
        }
        if name
            .chars()
            .any(|ch| ch == '/' || ch == '\\' || ch.is_control())
        {
            return Err(FileNameError::ForbiddenCharacter { name });
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FileName {
    type Error = FileNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FileName> for String {
    fn from(value: FileName) -> Self {
        value.0
    }
}

/// Location of a blob: a sequence of validated segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobPath(Vec<String>);

impl BlobPath {
    /// `courses/{c}/chapters/{ch}/lessons/{l}/homeworks/{h}/{name}`.
    pub fn homework_file(key: &HomeworkKey, name: &FileName) -> Self {
        let mut segments: Vec<String> = key
            .document_path()
            .segments()
            .into_iter()
            .map(str::to_owned)
            .collect();
        segments.push(name.as_str().to_owned());
        Self(segments)
    }

    /// `files/{name}`.
    pub fn loose_file(name: &FileName) -> Self {
        Self(vec![LOOSE_FILES_PREFIX.to_owned(), name.as_str().to_owned()])
    }

    /// Parse a slash-separated path, validating every segment.
    pub fn parse(raw: &str) -> Result<Self, FileNameError> {
        let segments = raw
            .split('/')
            .map(|segment| FileName::new(segment).map(String::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Final segment.
    pub fn file_name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Reference to a stored file as kept on homework documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRef {
    /// Retrieval URL handed out by the blob store.
    #[schema(value_type = String)]
    pub url: Url,
    /// Display name.
    pub name: String,
}

/// Bytes to store plus optional media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// Media type reported by the uploader.
    pub content_type: Option<String>,
}
