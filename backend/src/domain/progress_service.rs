//! Progress service implementing the [`ProgressTable`] driving port.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Cursor, PageParams};
use serde_json::json;

use crate::domain::ports::{Direction, DocumentQuery, DocumentStore, ProgressTable};
use crate::domain::service_support::{load_snapshot, map_store_error, require_document};
use crate::domain::{
    DocumentId, Error, FieldPath, FieldUpdate, FileField, JoinedProgressRow, PercentField,
    ProgressCursorKey, ProgressDraft, ProgressPage, ProgressRow, progress_fields,
    table_collection,
};

/// Progress service over a document store.
pub struct ProgressService<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> ProgressService<S> {
    /// Create the service.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

fn decode_cursor(token: &str) -> Result<ProgressCursorKey, Error> {
    Cursor::<ProgressCursorKey>::decode(token)
        .map(Cursor::into_inner)
        .map_err(|err| Error::invalid_request(format!("invalid cursor: {err}")))
}

fn encode_cursor(key: ProgressCursorKey) -> Result<String, Error> {
    Cursor::new(key)
        .encode()
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))
}

impl<S> ProgressService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn load_row(&self, row_id: &DocumentId) -> Result<ProgressRow, Error> {
        let path = table_collection().doc(row_id.clone());
        let document = require_document(&*self.store, &path).await?;
        Ok(ProgressRow::from_document(&document))
    }

    async fn overwrite_files(
        &self,
        row_id: &DocumentId,
        field: FileField,
        files: &[String],
    ) -> Result<(), Error> {
        let path = table_collection().doc(row_id.clone());
        self.store
            .update(&path, &[FieldUpdate::Set(field.path(), json!(files))])
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S> ProgressTable for ProgressService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn fetch_page(
        &self,
        student_id: &DocumentId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<ProgressPage<ProgressRow>, Error> {
        let params = PageParams::new(cursor, limit);
        let limit = params
            .limit()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut query = DocumentQuery::collection(table_collection())
            .where_eq(progress_fields::STUDENT_ID, json!(student_id.as_str()))
            .order_by(FieldPath::top(progress_fields::TIMESTAMP), Direction::Descending)
            .limit(limit + 1);
        if let Some(token) = params.cursor() {
            let key = decode_cursor(token)?;
            let last_id = DocumentId::new(key.id)
                .map_err(|err| Error::invalid_request(format!("invalid cursor: {err}")))?;
            query = query.start_after(key.timestamp, last_id);
        }

        let mut documents = self.store.query(&query).await.map_err(map_store_error)?;
        let has_more = documents.len() > limit;
        documents.truncate(limit);

        let next_cursor = match documents.last() {
            Some(last) if has_more => Some(encode_cursor(ProgressCursorKey::of(last))?),
            _ => None,
        };
        let rows = documents.iter().map(ProgressRow::from_document).collect();
        Ok(ProgressPage { rows, next_cursor })
    }

    async fn fetch_joined_page(
        &self,
        student_id: &DocumentId,
        cursor: Option<String>,
        limit: Option<usize>,
    ) -> Result<ProgressPage<JoinedProgressRow>, Error> {
        let page = self.fetch_page(student_id, cursor, limit).await?;
        let snapshot = load_snapshot(&*self.store).await?;
        let today = self.clock.utc().date_naive();

        let rows = page
            .rows
            .into_iter()
            .map(|row| JoinedProgressRow {
                refs: snapshot.resolve(
                    row.course_id.as_deref(),
                    row.chapter_id.as_deref(),
                    row.lesson_id.as_deref(),
                ),
                view: row.view(today),
                row,
            })
            .collect();
        Ok(ProgressPage {
            rows,
            next_cursor: page.next_cursor,
        })
    }

    async fn add_row(&self, draft: ProgressDraft) -> Result<DocumentId, Error> {
        if draft.student_id.trim().is_empty() {
            return Err(Error::invalid_request("studentId must not be empty"));
        }
        let timestamp = self.clock.utc().timestamp_millis();
        self.store
            .create(&table_collection(), draft.into_fields(timestamp))
            .await
            .map_err(map_store_error)
    }

    async fn delete_row(&self, row_id: &DocumentId) -> Result<(), Error> {
        self.store
            .delete(&table_collection().doc(row_id.clone()))
            .await
            .map_err(map_store_error)
    }

    async fn append_files(
        &self,
        row_id: &DocumentId,
        field: FileField,
        urls: Vec<String>,
    ) -> Result<Vec<String>, Error> {
        let row = self.load_row(row_id).await?;
        let mut files = row.files(field).to_vec();
        files.extend(urls);
        self.overwrite_files(row_id, field, &files).await?;
        Ok(files)
    }

    async fn remove_file(
        &self,
        row_id: &DocumentId,
        field: FileField,
        url: String,
    ) -> Result<Vec<String>, Error> {
        let row = self.load_row(row_id).await?;
        let files: Vec<String> = row
            .files(field)
            .iter()
            .filter(|existing| **existing != url)
            .cloned()
            .collect();
        self.overwrite_files(row_id, field, &files).await?;
        Ok(files)
    }

    async fn set_percentage(
        &self,
        row_id: &DocumentId,
        field: PercentField,
        value: f64,
    ) -> Result<(), Error> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(Error::invalid_request(format!(
                "{} must be between 0 and 100",
                field.as_str()
            )));
        }
        self.store
            .update(
                &table_collection().doc(row_id.clone()),
                &[FieldUpdate::Set(field.path(), json!(value))],
            )
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    //! Progress service behaviour against a mocked store.

    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{DocumentStoreError, MockDocumentStore};
    use crate::domain::{Document, ErrorCode, FieldMap, ProgressView};

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    #[fixture]
    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixtureClock {
            utc_now: Utc
                .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
                .single()
                .expect("valid instant"),
        })
    }

    fn id(raw: &str) -> DocumentId {
        DocumentId::new(raw).expect("valid id")
    }

    fn row_document(raw_id: &str, timestamp: i64, stored: Value) -> Document {
        let mut fields: FieldMap = stored.as_object().cloned().expect("object");
        fields.insert("studentId".to_owned(), json!("s1"));
        fields.insert("timestamp".to_owned(), json!(timestamp));
        Document::new(id(raw_id), fields)
    }

    #[rstest]
    #[tokio::test]
    async fn first_page_requests_one_extra_row(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .withf(|query| {
                query.limit == Some(3)
                    && query.start_after.is_none()
                    && query.filters == vec![("studentId".to_owned(), json!("s1"))]
            })
            .return_once(|_| {
                Ok(vec![
                    row_document("r3", 30, json!({})),
                    row_document("r2", 20, json!({})),
                    row_document("r1", 10, json!({})),
                ])
            });
        let page = ProgressService::new(Arc::new(store), clock)
            .fetch_page(&id("s1"), None, Some(2))
            .await
            .expect("page fetched");
        assert_eq!(page.rows.len(), 2);
        let cursor = page.next_cursor.expect("more rows");
        let key = decode_cursor(&cursor).expect("decodable");
        assert_eq!(key, ProgressCursorKey { timestamp: json!(20), id: "r2".to_owned() });
    }

    #[rstest]
    #[case::string(json!("20"))]
    #[case::float(json!(20.5))]
    #[tokio::test]
    async fn cursor_keeps_the_stored_timestamp(clock: Arc<dyn Clock>, #[case] stored: Value) {
        let expected = stored.clone();
        let mut store = MockDocumentStore::new();
        store.expect_query().return_once(move |_| {
            let mut second = row_document("r2", 0, json!({}));
            second.fields.insert("timestamp".to_owned(), stored);
            let mut third = row_document("r1", 0, json!({}));
            third.fields.remove("timestamp");
            Ok(vec![row_document("r3", 30, json!({})), second, third])
        });
        let page = ProgressService::new(Arc::new(store), clock)
            .fetch_page(&id("s1"), None, Some(2))
            .await
            .expect("page fetched");
        let key = decode_cursor(&page.next_cursor.expect("more rows")).expect("decodable");
        assert_eq!(key, ProgressCursorKey { timestamp: expected, id: "r2".to_owned() });
    }

    #[rstest]
    #[tokio::test]
    async fn cursor_becomes_start_after(clock: Arc<dyn Clock>) {
        let token = encode_cursor(ProgressCursorKey {
            timestamp: json!(20),
            id: "r2".to_owned(),
        })
        .expect("encodable");
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .withf(|query| {
                query
                    .start_after
                    .as_ref()
                    .is_some_and(|after| after.value == json!(20) && after.id.as_str() == "r2")
            })
            .return_once(|_| Ok(vec![row_document("r1", 10, json!({}))]));
        let page = ProgressService::new(Arc::new(store), clock)
            .fetch_page(&id("s1"), Some(token), Some(2))
            .await
            .expect("page fetched");
        assert_eq!(page.rows.len(), 1);
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    #[case(Some("%%%".to_owned()), None)]
    #[case(None, Some(0))]
    #[tokio::test]
    async fn bad_paging_input_is_rejected(
        clock: Arc<dyn Clock>,
        #[case] cursor: Option<String>,
        #[case] limit: Option<usize>,
    ) {
        let err = ProgressService::new(Arc::new(MockDocumentStore::new()), clock)
            .fetch_page(&id("s1"), cursor, limit)
            .await
            .expect_err("invalid paging");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn add_row_stamps_clock_time(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_create()
            .withf(|_, stored| stored.get("timestamp") == Some(&json!(1_710_072_000_000_i64)))
            .return_once(|_, _| Ok(id("new-row")));
        let created = ProgressService::new(Arc::new(store), clock)
            .add_row(ProgressDraft {
                student_id: "s1".to_owned(),
                ..ProgressDraft::default()
            })
            .await
            .expect("row added");
        assert_eq!(created, id("new-row"));
    }

    #[rstest]
    #[tokio::test]
    async fn append_overwrites_whole_array(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .return_once(|_| Ok(Some(row_document("r1", 1, json!({ "submittedFiles": ["a"] })))));
        store
            .expect_update()
            .withf(|_, updates| {
                updates
                    == [FieldUpdate::Set(
                        FieldPath::top("submittedFiles"),
                        json!(["a", "b", "c"]),
                    )]
            })
            .times(1)
            .return_once(|_, _| Ok(()));
        let files = ProgressService::new(Arc::new(store), clock)
            .append_files(
                &id("r1"),
                FileField::Submitted,
                vec!["b".to_owned(), "c".to_owned()],
            )
            .await
            .expect("appended");
        assert_eq!(files, ["a", "b", "c"]);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_writes_nested_result_files(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store.expect_get().return_once(|_| {
            Ok(Some(row_document(
                "r1",
                1,
                json!({ "results": { "percentage": 50, "files": ["x", "y", "x"] } }),
            )))
        });
        store
            .expect_update()
            .withf(|_, updates| {
                updates
                    == [FieldUpdate::Set(
                        FieldPath::nested(&["results", "files"]),
                        json!(["y"]),
                    )]
            })
            .return_once(|_, _| Ok(()));
        let files = ProgressService::new(Arc::new(store), clock)
            .remove_file(&id("r1"), FileField::Results, "x".to_owned())
            .await
            .expect("removed");
        assert_eq!(files, ["y"]);
    }

    #[rstest]
    #[tokio::test]
    async fn mutation_of_missing_row_is_not_found(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store.expect_get().return_once(|_| Ok(None));
        let err = ProgressService::new(Arc::new(store), clock)
            .append_files(&id("gone"), FileField::Checked, vec!["u".to_owned()])
            .await
            .expect_err("missing row");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(100.5)]
    #[case(f64::NAN)]
    #[tokio::test]
    async fn percentage_outside_range_is_rejected(clock: Arc<dyn Clock>, #[case] value: f64) {
        let err = ProgressService::new(Arc::new(MockDocumentStore::new()), clock)
            .set_percentage(&id("r1"), PercentField::Results, value)
            .await
            .expect_err("out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn joined_page_marks_dangling_references(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store.expect_query().returning(|query| {
            if query.collection == table_collection() {
                Ok(vec![row_document(
                    "r1",
                    1,
                    json!({ "courseId": "deleted", "date": "2024-03-20", "progress": "" }),
                )])
            } else {
                Ok(Vec::new())
            }
        });
        let page = ProgressService::new(Arc::new(store), clock)
            .fetch_joined_page(&id("s1"), None, None)
            .await
            .expect("joined page");
        let row = page.rows.first().expect("one row");
        assert!(row.refs.course.is_none());
        assert_eq!(row.view, ProgressView::Future);
    }

    #[rstest]
    #[tokio::test]
    async fn store_outage_is_service_unavailable(clock: Arc<dyn Clock>) {
        let mut store = MockDocumentStore::new();
        store
            .expect_delete()
            .return_once(|_| Err(DocumentStoreError::connection("refused")));
        let err = ProgressService::new(Arc::new(store), clock)
            .delete_row(&id("r1"))
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
