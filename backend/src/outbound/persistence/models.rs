//! Row types for the `documents` table. Internal to the adapter.

use diesel::prelude::*;
use serde_json::Value;

use super::schema::documents;

/// Columns read back for a document.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: String,
    pub fields: Value,
}

/// Insert payload for a document.
#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub collection_path: &'a str,
    pub id: &'a str,
    pub fields: &'a Value,
}
