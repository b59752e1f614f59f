//! Normalized result cache.
//!
//! Query results are stored per request key, and any object carrying an
//! integer `id` is additionally indexed by entity identity so different
//! queries touching the same book/category/review share one record.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

#[derive(Default)]
pub struct DocumentCache {
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    results: HashMap<String, Value>,
    entities: HashMap<String, Value>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &str) -> Option<Value> {
        self.inner.lock().expect("cache lock").results.get(key).cloned()
    }

    pub fn write(&self, key: &str, data: &Value) {
        let mut inner = self.inner.lock().expect("cache lock");
        inner.results.insert(key.to_string(), data.clone());
        normalize_into(&mut inner.entities, None, data);
    }

    /// Look up a normalized record, e.g. `entity("book", 3)`.
    pub fn entity(&self, entity: &str, id: i64) -> Option<Value> {
        self.inner
            .lock()
            .expect("cache lock")
            .entities
            .get(&format!("{entity}:{id}"))
            .cloned()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock");
        inner.results.clear();
        inner.entities.clear();
    }
}

/// Entity name for a result field. Only fields of the backend contract are
/// normalized; anything unrecognized is walked but not indexed.
fn entity_for_field(field: &str) -> Option<&'static str> {
    match field {
        "books" | "getBook" | "createBook" | "updateBook" => Some("book"),
        "category" | "getCategories" | "createCategory" => Some("category"),
        "reviews" | "writeReview" => Some("review"),
        _ => None,
    }
}

fn normalize_into(entities: &mut HashMap<String, Value>, field: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            let id = map.get("id").and_then(Value::as_i64);
            if let (Some(entity), Some(id)) = (field.and_then(entity_for_field), id) {
                entities.insert(format!("{entity}:{id}"), value.clone());
            }
            for (key, nested) in map {
                normalize_into(entities, Some(key), nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_into(entities, field, item);
            }
        }
        _ => {}
    }
}
