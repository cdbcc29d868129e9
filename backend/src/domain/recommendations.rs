//! Teacher recommendation tabs, stored per student.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::document::read;
use super::{CollectionPath, Document, DocumentId, FieldMap, collections};

/// Field names of tab documents.
pub mod fields {
    /// Tab caption.
    pub const LABEL: &str = "label";
    /// Icon name shown next to the caption.
    pub const ICON: &str = "icon";
    /// Recommended items.
    pub const ITEMS: &str = "items";
}

/// Collection of tabs for one student.
pub fn tabs_collection(student_id: &DocumentId) -> CollectionPath {
    CollectionPath::root(collections::TEACHER_RECOMMENDATIONS)
        .doc(student_id.clone())
        .child(collections::TABS)
}

/// One recommended item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecommendationItem {
    /// Headline.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub description: String,
}

/// A recommendation tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationTab {
    /// Tab identifier.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Caption.
    pub label: String,
    /// Icon name.
    pub icon: String,
    /// Items in display order.
    pub items: Vec<RecommendationItem>,
}

impl RecommendationTab {
    /// Decode a stored tab, skipping malformed items.
    pub fn from_document(document: &Document) -> Self {
        let items = match document.fields.get(fields::ITEMS) {
            Some(Value::Array(raw)) => raw
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            id: document.id.clone(),
            label: read::string(&document.fields, fields::LABEL),
            icon: read::string(&document.fields, fields::ICON),
            items,
        }
    }

    /// Field map to store.
    pub fn to_fields(&self) -> FieldMap {
        let mut stored = FieldMap::new();
        stored.insert(fields::LABEL.to_owned(), json!(self.label));
        stored.insert(fields::ICON.to_owned(), json!(self.icon));
        stored.insert(fields::ITEMS.to_owned(), json!(self.items));
        stored
    }
}
