//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    /// Schemaless documents keyed by collection path and id.
    documents (collection_path, id) {
        /// Slash-joined path of the owning collection.
        collection_path -> Text,
        /// Document identifier within the collection.
        id -> Text,
        /// Field map as a JSON object.
        fields -> Jsonb,
        /// Insertion time.
        created_at -> Timestamptz,
        /// Last write time.
        updated_at -> Timestamptz,
    }
}
