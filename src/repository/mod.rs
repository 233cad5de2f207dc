//! Repository layer over the document store
//!
//! [`DocumentStore`] is the persistence collaborator: it stores JSON bodies
//! per [`EntityKind`] and answers containment filters. [`Repository`] is the
//! typed facade the services use; it owns projection, reference population
//! and the mapping between documents and model types, so both backends only
//! have to implement plain CRUD.

pub mod memory;
pub mod postgres;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Draft, Entity, EntityKind},
};

/// A stored document: identity plus body (the body never holds the id)
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
}

impl Document {
    /// Body with the id folded in, ready to deserialize into a model
    pub fn into_json(self) -> Value {
        let mut object = match self.body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        object.insert("id".to_string(), Value::String(self.id.to_string()));
        Value::Object(object)
    }
}

/// JSON containment filter: a document matches when its body contains the pattern
#[derive(Debug, Clone, PartialEq)]
pub struct Filter(Value);

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

impl Filter {
    pub fn all() -> Self {
        Filter(json!({}))
    }

    /// `field` equals `value`
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        Filter(json!({ field: value }))
    }

    /// List `field` has `value` among its elements
    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        Filter(json!({ field: [value] }))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn matches(&self, body: &Value) -> bool {
        json_contains(body, &self.0)
    }
}

/// Same semantics as PostgreSQL's `jsonb @> jsonb`
pub fn json_contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        // A top-level array contains a bare scalar; nested arrays do not
        (Value::Array(h), scalar) if !scalar.is_object() && !scalar.is_array() => {
            h.iter().any(|found| found == scalar)
        }
        _ => contains_nested(haystack, needle),
    }
}

fn contains_nested(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::Object(h), Value::Object(n)) => n
            .iter()
            .all(|(key, value)| h.get(key).is_some_and(|found| contains_nested(found, value))),
        (Value::Array(h), Value::Array(n)) => n
            .iter()
            .all(|value| h.iter().any(|found| contains_nested(found, value))),
        (h, n) => h == n,
    }
}

/// Replace a reference field with the referenced record on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Populate {
    pub field: &'static str,
    pub kind: EntityKind,
}

impl Populate {
    pub const fn new(field: &'static str, kind: EntityKind) -> Self {
        Self { field, kind }
    }
}

/// Read query: filter, optional projection and sort key, populated references
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub projection: Option<&'static [&'static str]>,
    pub sort: Option<&'static str>,
    pub populate: Vec<Populate>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Keep only these body fields (the id is always kept)
    pub fn project(mut self, fields: &'static [&'static str]) -> Self {
        self.projection = Some(fields);
        self
    }

    /// Ascending by a body field
    pub fn sort_by(mut self, field: &'static str) -> Self {
        self.sort = Some(field);
        self
    }

    pub fn populate(mut self, field: &'static str, kind: EntityKind) -> Self {
        self.populate.push(Populate::new(field, kind));
        self
    }
}

/// Persistence collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents of `kind` matching `filter`, ascending by `sort` then insertion order
    async fn find(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>>;

    async fn find_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> AppResult<Vec<Document>>;

    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<Option<Document>>;

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64>;

    /// Store a new document under a fresh id
    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<Document>;

    /// Replace the body; `NotFound` when no such document
    async fn update_by_id(&self, kind: EntityKind, id: Uuid, body: Value) -> AppResult<Document>;

    /// `NotFound` when no such document
    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> AppResult<()>;
}

pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", kind, id))
}

/// Typed facade shared by every service
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Repository over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(memory::MemoryStore::new()))
    }

    /// Record by id, `NotFound` when absent
    pub async fn find_by_id<T: Entity>(&self, id: Uuid, populate: &[Populate]) -> AppResult<T> {
        self.find_optional(id, populate)
            .await?
            .ok_or_else(|| not_found(T::KIND, id))
    }

    pub async fn find_optional<T: Entity>(
        &self,
        id: Uuid,
        populate: &[Populate],
    ) -> AppResult<Option<T>> {
        let Some(document) = self.store.find_by_id(T::KIND, id).await? else {
            return Ok(None);
        };
        let mut records = self.populate(vec![document.into_json()], populate).await?;
        match records.pop() {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => Ok(None),
        }
    }

    pub async fn find<T: Entity>(&self, query: &Query) -> AppResult<Vec<T>> {
        let documents = self.store.find(T::KIND, &query.filter, query.sort).await?;
        let records = documents
            .into_iter()
            .map(|document| project(document.into_json(), query.projection))
            .collect();
        self.populate(records, &query.populate)
            .await?
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(AppError::from))
            .collect()
    }

    pub async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        self.store.count(kind, filter).await
    }

    pub async fn create<D: Draft>(&self, draft: &D) -> AppResult<D::Record> {
        let body = serde_json::to_value(draft)?;
        let document = self.store.insert(<D::Record as Entity>::KIND, body).await?;
        Ok(serde_json::from_value(document.into_json())?)
    }

    /// Full replace of the record's fields, keeping its id
    pub async fn replace<D: Draft>(&self, id: Uuid, draft: &D) -> AppResult<D::Record> {
        let body = serde_json::to_value(draft)?;
        let document = self
            .store
            .update_by_id(<D::Record as Entity>::KIND, id, body)
            .await?;
        Ok(serde_json::from_value(document.into_json())?)
    }

    pub async fn remove(&self, kind: EntityKind, id: Uuid) -> AppResult<()> {
        self.store.delete_by_id(kind, id).await
    }

    /// Swap reference ids for the referenced records; dangling ids stay as they are
    async fn populate(&self, mut records: Vec<Value>, populate: &[Populate]) -> AppResult<Vec<Value>> {
        for target in populate {
            let mut ids: Vec<Uuid> = records
                .iter()
                .flat_map(|record| reference_ids(record.get(target.field)))
                .collect();
            ids.sort();
            ids.dedup();
            if ids.is_empty() {
                continue;
            }

            let found: HashMap<String, Value> = self
                .store
                .find_by_ids(target.kind, &ids)
                .await?
                .into_iter()
                .map(|document| (document.id.to_string(), document.into_json()))
                .collect();

            for record in &mut records {
                if let Some(slot) = record.get_mut(target.field) {
                    resolve(slot, &found);
                }
            }
        }
        Ok(records)
    }
}

fn project(record: Value, fields: Option<&[&str]>) -> Value {
    match (fields, record) {
        (Some(fields), Value::Object(mut map)) => {
            map.retain(|key, _| key == "id" || fields.contains(&key.as_str()));
            Value::Object(map)
        }
        (_, record) => record,
    }
}

fn reference_ids(value: Option<&Value>) -> Vec<Uuid> {
    match value {
        Some(Value::String(id)) => Uuid::parse_str(id).into_iter().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve(slot: &mut Value, found: &HashMap<String, Value>) {
    let replacement = match slot {
        Value::String(id) => found.get(id.as_str()).cloned(),
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve(item, found);
            }
            None
        }
        _ => None,
    };
    if let Some(record) = replacement {
        *slot = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_containment() {
        let body = json!({ "author": "a1", "genre": ["g1", "g2"], "status": "Available" });

        assert!(Filter::all().matches(&body));
        assert!(Filter::eq("author", "a1").matches(&body));
        assert!(!Filter::eq("author", "a2").matches(&body));
        assert!(Filter::contains("genre", "g2").matches(&body));
        assert!(!Filter::contains("genre", "g3").matches(&body));
        assert!(Filter::eq("status", "Available").matches(&body));
        assert!(!Filter::eq("missing", "x").matches(&body));
    }

    #[test]
    fn test_scalar_in_array_matches_only_at_top_level() {
        assert!(json_contains(&json!(["g1", "g2"]), &json!("g1")));
        assert!(!json_contains(&json!(["g1"]), &json!("g3")));

        let body = json!({ "genre": ["g1"], "nested": { "tags": ["x"] } });
        assert!(!json_contains(&body, &json!({ "genre": "g1" })));
        assert!(!json_contains(&body, &json!({ "nested": { "tags": "x" } })));
        assert!(json_contains(&body, &json!({ "nested": { "tags": ["x"] } })));
    }

    #[test]
    fn test_projection_keeps_id() {
        let record = json!({ "id": "x", "title": "Dune", "summary": "desc", "isbn": "1" });
        let projected = project(record, Some(&["title"][..]));
        assert_eq!(projected, json!({ "id": "x", "title": "Dune" }));
    }

    #[test]
    fn test_resolve_scalar_and_list() {
        let g1 = Uuid::new_v4().to_string();
        let dangling = Uuid::new_v4().to_string();
        let found = HashMap::from([(g1.clone(), json!({ "id": g1, "name": "SciFi" }))]);

        let mut slot = json!([g1, dangling]);
        resolve(&mut slot, &found);
        assert_eq!(slot[0]["name"], "SciFi");
        assert_eq!(slot[1], json!(dangling));
    }
}
