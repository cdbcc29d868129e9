//! PostgreSQL-backed [`DocumentStore`] using Diesel.
//!
//! All documents share one `documents` table keyed by
//! `(collection_path, id)`; fields live in a JSONB object. Collection
//! queries are assembled as parameterised SQL because the sort field is only
//! known at runtime:
//!
//! - equality filters become one `fields @> $filter` containment test;
//! - ordering uses `COALESCE(fields #> $path, 'null')` so missing fields sort
//!   as JSON `null`, with `id COLLATE "C"` as the byte-wise tie-breaker;
//! - keyset continuation is a row comparison against the cursor.
//!
//! Field merges lock the row (`SELECT … FOR UPDATE`) and apply the updates
//! in Rust inside one transaction; batches run in a single transaction.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Array, BigInt, Jsonb, Text};
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use serde_json::Value;

use crate::domain::ports::{
    BatchWrite, Direction, DocumentQuery, DocumentStore, DocumentStoreError, WriteBatch,
};
use crate::domain::{
    CollectionPath, Document, DocumentId, DocumentPath, FieldMap, FieldUpdate, apply_updates,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow};
use super::pool::DbPool;
use super::schema::documents;

/// Diesel-backed implementation of the [`DocumentStore`] port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    /// Create a store over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a write transaction.
#[derive(Debug)]
enum WriteFailure {
    Database(diesel::result::Error),
    Missing(String),
}

impl From<diesel::result::Error> for WriteFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<WriteFailure> for DocumentStoreError {
    fn from(failure: WriteFailure) -> Self {
        match failure {
            WriteFailure::Database(error) => map_diesel_error(error),
            WriteFailure::Missing(path) => Self::not_found(path),
        }
    }
}

fn into_field_map(value: Value) -> FieldMap {
    match value {
        Value::Object(fields) => fields,
        _ => FieldMap::new(),
    }
}

fn into_document(row: DocumentRow) -> Result<Document, DocumentStoreError> {
    let id = DocumentId::new(row.id)
        .map_err(|err| DocumentStoreError::query(format!("stored id is invalid: {err}")))?;
    Ok(Document::new(id, into_field_map(row.fields)))
}

async fn upsert(
    conn: &mut AsyncPgConnection,
    path: &DocumentPath,
    fields: &Value,
) -> QueryResult<()> {
    let collection = path.collection().to_string();
    let row = NewDocumentRow {
        collection_path: &collection,
        id: path.id().as_str(),
        fields,
    };
    diesel::insert_into(documents::table)
        .values(&row)
        .on_conflict((documents::collection_path, documents::id))
        .do_update()
        .set((
            documents::fields.eq(fields),
            documents::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .await
        .map(|_| ())
}

async fn merge(
    conn: &mut AsyncPgConnection,
    path: &DocumentPath,
    updates: &[FieldUpdate],
) -> Result<(), WriteFailure> {
    let collection = path.collection().to_string();
    let stored: Option<Value> = documents::table
        .filter(documents::collection_path.eq(&collection))
        .filter(documents::id.eq(path.id().as_str()))
        .select(documents::fields)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let Some(stored) = stored else {
        return Err(WriteFailure::Missing(path.to_string()));
    };

    let mut fields = into_field_map(stored);
    apply_updates(&mut fields, updates);
    diesel::update(
        documents::table
            .filter(documents::collection_path.eq(&collection))
            .filter(documents::id.eq(path.id().as_str())),
    )
    .set((
        documents::fields.eq(Value::Object(fields)),
        documents::updated_at.eq(diesel::dsl::now),
    ))
    .execute(conn)
    .await?;
    Ok(())
}

async fn remove(conn: &mut AsyncPgConnection, path: &DocumentPath) -> QueryResult<()> {
    let collection = path.collection().to_string();
    diesel::delete(
        documents::table
            .filter(documents::collection_path.eq(&collection))
            .filter(documents::id.eq(path.id().as_str())),
    )
    .execute(conn)
    .await
    .map(|_| ())
}

/// Bound parameter of a collection query.
#[derive(Debug, Clone, PartialEq)]
enum Param {
    Text(String),
    Json(Value),
    Path(Vec<String>),
    Int(i64),
}

/// SQL text plus its parameters in placeholder order.
#[derive(Debug, Default)]
struct QueryPlan {
    sql: String,
    params: Vec<Param>,
}

impl QueryPlan {
    /// Register a parameter and return its placeholder.
    fn param(&mut self, value: Param) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn plan(query: &DocumentQuery) -> Self {
        let mut plan = Self::default();
        let collection = plan.param(Param::Text(query.collection.to_string()));
        let filter: FieldMap = query.filters.iter().cloned().collect();
        let filter = plan.param(Param::Json(Value::Object(filter)));
        let mut sql = format!(
            "SELECT id, fields FROM documents WHERE collection_path = {collection} AND fields @> {filter}"
        );

        match &query.order_by {
            Some(order) => {
                let path = plan.param(Param::Path(order.field.segments().to_vec()));
                let key = format!("COALESCE(fields #> {path}, 'null'::jsonb)");
                let (keyword, comparison) = match order.direction {
                    Direction::Ascending => ("ASC", ">"),
                    Direction::Descending => ("DESC", "<"),
                };
                if let Some(cursor) = &query.start_after {
                    let value = plan.param(Param::Json(cursor.value.clone()));
                    let id = plan.param(Param::Text(cursor.id.as_str().to_owned()));
                    sql.push_str(&format!(
                        " AND ({key}, id COLLATE \"C\") {comparison} ({value}, {id})"
                    ));
                }
                sql.push_str(&format!(
                    " ORDER BY {key} {keyword}, id COLLATE \"C\" {keyword}"
                ));
            }
            None => {
                if let Some(cursor) = &query.start_after {
                    let id = plan.param(Param::Text(cursor.id.as_str().to_owned()));
                    sql.push_str(&format!(" AND id COLLATE \"C\" > {id}"));
                }
                sql.push_str(" ORDER BY id COLLATE \"C\" ASC");
            }
        }

        if let Some(limit) = query.limit {
            let limit = plan.param(Param::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        plan.sql = sql;
        plan
    }

    fn into_query(self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        self.params
            .into_iter()
            .fold(diesel::sql_query(self.sql).into_boxed(), |query, param| {
                match param {
                    Param::Text(text) => query.bind::<Text, _>(text),
                    Param::Json(value) => query.bind::<Jsonb, _>(value),
                    Param::Path(segments) => query.bind::<Array<Text>, _>(segments),
                    Param::Int(number) => query.bind::<BigInt, _>(number),
                }
            })
    }
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let collection = path.collection().to_string();
        let row: Option<DocumentRow> = documents::table
            .filter(documents::collection_path.eq(&collection))
            .filter(documents::id.eq(path.id().as_str()))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(into_document).transpose()
    }

    async fn query(&self, query: &DocumentQuery) -> Result<Vec<Document>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DocumentRow> = QueryPlan::plan(query)
            .into_query()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(into_document).collect()
    }

    async fn create(
        &self,
        collection: &CollectionPath,
        fields: FieldMap,
    ) -> Result<DocumentId, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = DocumentId::generate();
        let collection = collection.to_string();
        let fields = Value::Object(fields);
        diesel::insert_into(documents::table)
            .values(&NewDocumentRow {
                collection_path: &collection,
                id: id.as_str(),
                fields: &fields,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(id)
    }

    async fn set(&self, path: &DocumentPath, fields: FieldMap) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        upsert(&mut conn, path, &Value::Object(fields))
            .await
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        path: &DocumentPath,
        updates: &[FieldUpdate],
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<(), WriteFailure, _>(|conn| {
            async move { merge(conn, path, updates).await }.scope_boxed()
        })
        .await
        .map_err(DocumentStoreError::from)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        remove(&mut conn, path).await.map_err(map_diesel_error)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), DocumentStoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let writes = batch.into_writes();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<(), WriteFailure, _>(|conn| {
            async move {
                for write in writes {
                    match write {
                        BatchWrite::Set { path, fields } => {
                            upsert(conn, &path, &Value::Object(fields)).await?;
                        }
                        BatchWrite::Update { path, updates } => {
                            merge(conn, &path, &updates).await?;
                        }
                        BatchWrite::Delete { path } => remove(conn, &path).await?,
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(DocumentStoreError::from)
    }
}

#[cfg(test)]
mod tests {
    //! SQL generation; execution is covered against a live database only.

    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::{FieldPath, collections};

    fn table() -> DocumentQuery {
        DocumentQuery::collection(CollectionPath::root(collections::TABLE_DATA))
    }

    #[rstest]
    fn unordered_query_sorts_by_id() {
        let plan = QueryPlan::plan(&table());
        assert_eq!(
            plan.sql,
            "SELECT id, fields FROM documents WHERE collection_path = $1 AND fields @> $2 \
             ORDER BY id COLLATE \"C\" ASC"
        );
        assert_eq!(
            plan.params,
            vec![Param::Text("tableData".to_owned()), Param::Json(json!({}))]
        );
    }

    #[rstest]
    fn keyset_page_binds_cursor_in_order() {
        let query = table()
            .where_eq("studentId", json!("s1"))
            .order_by(FieldPath::top("timestamp"), Direction::Descending)
            .start_after(json!(1_700), DocumentId::new("row9").expect("id"))
            .limit(21);
        let plan = QueryPlan::plan(&query);
        assert!(plan.sql.contains(
            "AND (COALESCE(fields #> $3, 'null'::jsonb), id COLLATE \"C\") < ($4, $5)"
        ));
        assert!(plan.sql.ends_with(
            "ORDER BY COALESCE(fields #> $3, 'null'::jsonb) DESC, id COLLATE \"C\" DESC LIMIT $6"
        ));
        assert_eq!(
            plan.params,
            vec![
                Param::Text("tableData".to_owned()),
                Param::Json(json!({ "studentId": "s1" })),
                Param::Path(vec!["timestamp".to_owned()]),
                Param::Json(json!(1_700)),
                Param::Text("row9".to_owned()),
                Param::Int(21),
            ]
        );
    }

    #[rstest]
    fn nested_collections_use_full_path() {
        let chapters = CollectionPath::root(collections::COURSES)
            .doc(DocumentId::new("c1").expect("id"))
            .child(collections::CHAPTERS);
        let plan = QueryPlan::plan(&DocumentQuery::collection(chapters));
        assert_eq!(
            plan.params.iter().next(),
            Some(&Param::Text("courses/c1/chapters".to_owned()))
        );
    }

    #[rstest]
    fn missing_write_target_maps_to_not_found() {
        let error = DocumentStoreError::from(WriteFailure::Missing("students/s1".to_owned()));
        assert_eq!(error, DocumentStoreError::not_found("students/s1"));
    }
}
