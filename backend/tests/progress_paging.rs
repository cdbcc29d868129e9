//! Keyset paging over rows whose stored timestamps are not plain integers.

use std::collections::HashSet;
use std::sync::Arc;

use classdesk::domain::ports::{DocumentStore, ProgressTable};
use classdesk::domain::{DocumentId, FieldMap, ProgressService, table_collection};
use classdesk::outbound::memory::InMemoryDocumentStore;
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

fn id(raw: &str) -> DocumentId {
    DocumentId::new(raw).expect("valid id")
}

async fn seed(store: &InMemoryDocumentStore, timestamps: &[Option<Value>]) {
    for (index, timestamp) in timestamps.iter().enumerate() {
        let mut fields = FieldMap::new();
        fields.insert("studentId".to_owned(), json!("s1"));
        if let Some(timestamp) = timestamp {
            fields.insert("timestamp".to_owned(), timestamp.clone());
        }
        store
            .set(&table_collection().doc(id(&format!("row{index}"))), fields)
            .await
            .expect("seeded");
    }
}

#[rstest]
#[case::missing(vec![None, None, None, None, None])]
#[case::strings(vec![
    Some(json!("105")),
    Some(json!("104")),
    Some(json!("103")),
    Some(json!("102")),
    Some(json!("101")),
])]
#[case::floats(vec![
    Some(json!(100.7)),
    Some(json!(100.5)),
    Some(json!(100.2)),
    Some(json!(99.9)),
    Some(json!(99.1)),
])]
#[case::mixed(vec![
    Some(json!(200)),
    None,
    Some(json!("150")),
    Some(json!(150.5)),
    Some(json!(150)),
])]
#[tokio::test]
async fn pages_cover_every_row_once(#[case] timestamps: Vec<Option<Value>>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed(&store, &timestamps).await;
    let service = ProgressService::new(store, Arc::new(DefaultClock));

    let mut seen = Vec::new();
    let mut cursor = None;
    for _ in 0..timestamps.len() + 1 {
        let page = service
            .fetch_page(&id("s1"), cursor, Some(2))
            .await
            .expect("page fetched");
        seen.extend(page.rows.iter().map(|row| row.id.as_str().to_owned()));
        cursor = page.next_cursor;
        if cursor.is_none() {
            break;
        }
    }

    assert!(cursor.is_none(), "paging did not terminate");
    assert_eq!(seen.len(), timestamps.len());
    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(unique.len(), timestamps.len());
}
