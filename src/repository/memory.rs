//! In-process document store

use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{not_found, Document, DocumentStore, Filter};
use crate::{error::AppResult, models::EntityKind};

/// Documents per kind, kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<EntityKind, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Strings compare byte-wise (the `COLLATE "C"` order), missing fields sort last
fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let key = |document: &Document| -> Option<String> {
        match document.body.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    };
    match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(&kind)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(&document.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(field) = sort {
            documents.sort_by(|a, b| compare_field(a, b, field));
        }
        Ok(documents)
    }

    async fn find_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&kind)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| ids.contains(&document.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&kind)
            .and_then(|documents| documents.iter().find(|document| document.id == id))
            .cloned())
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&kind)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(&document.body))
                    .count() as u64
            })
            .unwrap_or(0))
    }

    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<Document> {
        let document = Document {
            id: Uuid::new_v4(),
            body,
        };
        self.collections
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn update_by_id(&self, kind: EntityKind, id: Uuid, body: Value) -> AppResult<Document> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&kind)
            .and_then(|documents| documents.iter_mut().find(|document| document.id == id))
            .ok_or_else(|| not_found(kind, id))?;
        document.body = body;
        Ok(document.clone())
    }

    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let documents = collections.get_mut(&kind).ok_or_else(|| not_found(kind, id))?;
        let position = documents
            .iter()
            .position(|document| document.id == id)
            .ok_or_else(|| not_found(kind, id))?;
        documents.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();
        let kind = EntityKind::Genre;

        let created = store.insert(kind, json!({ "name": "Poetry" })).await.unwrap();
        assert_eq!(store.count(kind, &Filter::all()).await.unwrap(), 1);

        let updated = store
            .update_by_id(kind, created.id, json!({ "name": "Drama" }))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(
            store.find_by_id(kind, created.id).await.unwrap().unwrap().body["name"],
            "Drama"
        );

        store.delete_by_id(kind, created.id).await.unwrap();
        assert!(store.find_by_id(kind, created.id).await.unwrap().is_none());
        assert!(store.delete_by_id(kind, created.id).await.unwrap_err().is_not_found());
        assert!(store
            .update_by_id(kind, created.id, json!({}))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_find_filters_and_sorts() {
        let store = MemoryStore::new();
        let kind = EntityKind::Author;
        for (first, last) in [("Isaac", "Asimov"), ("Ursula", "Le Guin"), ("Frank", "Herbert")] {
            store
                .insert(kind, json!({ "firstName": first, "lastName": last }))
                .await
                .unwrap();
        }

        let sorted = store.find(kind, &Filter::all(), Some("lastName")).await.unwrap();
        let names: Vec<_> = sorted.iter().map(|d| d.body["lastName"].clone()).collect();
        assert_eq!(names, vec![json!("Asimov"), json!("Herbert"), json!("Le Guin")]);

        let filtered = store
            .find(kind, &Filter::eq("firstName", "Frank"), None)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        assert!(store
            .find(EntityKind::Book, &Filter::all(), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_sort_is_case_sensitive_byte_order() {
        let store = MemoryStore::new();
        let kind = EntityKind::Genre;
        for name in ["fantasy", "Poetry", "Horror"] {
            store.insert(kind, json!({ "name": name })).await.unwrap();
        }
        store.insert(kind, json!({})).await.unwrap();

        let sorted = store.find(kind, &Filter::all(), Some("name")).await.unwrap();
        let names: Vec<_> = sorted.iter().map(|d| d.body.get("name").cloned()).collect();
        assert_eq!(
            names,
            vec![Some(json!("Horror")), Some(json!("Poetry")), Some(json!("fantasy")), None]
        );
    }
}
