//! # Documents, Filters and Find Options
//!
//! The value model shared by every store backend. Documents are plain JSON
//! objects; filters are single-level equality maps.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document
pub type Document = Map<String, Value>;

/// Field name of the primary key
pub const ID_FIELD: &str = "_id";

/// Equality filter: every listed field must be present and equal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    clauses: Map<String, Value>,
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter on a single field
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    /// Add an equality clause
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.insert(field.into(), value.into());
        self
    }

    /// Whether the filter has no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Value required for a field, if constrained
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.clauses.get(field)
    }

    /// Every equality clause, field to required value
    pub fn clauses(&self) -> &Map<String, Value> {
        &self.clauses
    }

    /// Check a document against every clause
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Options for find operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// Fields to keep (`_id` is always kept)
    pub projection: Option<Vec<String>>,
    /// Sort keys, applied in order
    pub sort: Vec<SortKey>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Apply the projection to a document
    pub fn apply_projection(&self, doc: &Document) -> Document {
        match &self.projection {
            None => doc.clone(),
            Some(fields) => doc
                .iter()
                .filter(|(k, _)| k.as_str() == ID_FIELD || fields.iter().any(|f| f == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Sort documents in place (stable)
    pub fn apply_sort(&self, docs: &mut [Document]) {
        if self.sort.is_empty() {
            return;
        }
        docs.sort_by(|a, b| {
            for key in &self.sort {
                let ord = compare_values(a.get(&key.field), b.get(&key.field));
                let ord = match key.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}

/// Rank of a value's type in sort order
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values: type rank first, then value
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => x.len().cmp(&y.len()),
        (Some(Value::Object(x)), Some(Value::Object(y))) => x.len().cmp(&y.len()),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_filter_is_type_strict() {
        let d = doc(json!({"email": "a@b.com", "password": 12345678}));
        assert!(Filter::eq("email", "a@b.com").matches(&d));
        assert!(Filter::eq("password", 12345678).matches(&d));
        assert!(!Filter::eq("password", "12345678").matches(&d));
        assert!(!Filter::eq("missing", Value::Null).matches(&d));
        assert!(Filter::all().matches(&d));
    }

    #[test]
    fn test_projection_keeps_id() {
        let d = doc(json!({"_id": "s1", "email": "x", "password": "p", "name": "N"}));
        let projected = FindOptions::new().project(["email"]).apply_projection(&d);
        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("_id"));
        assert!(projected.contains_key("email"));
    }

    #[test]
    fn test_sort_orders_by_type_then_value() {
        let mut docs = vec![
            doc(json!({"k": "b"})),
            doc(json!({"k": 10})),
            doc(json!({})),
            doc(json!({"k": 2})),
            doc(json!({"k": "a"})),
        ];
        FindOptions::new()
            .sort_by(SortKey::asc("k"))
            .apply_sort(&mut docs);
        let keys: Vec<Option<&Value>> = docs.iter().map(|d| d.get("k")).collect();
        assert_eq!(
            keys,
            vec![None, Some(&json!(2)), Some(&json!(10)), Some(&json!("a")), Some(&json!("b"))]
        );
    }

    #[test]
    fn test_sort_descending() {
        let mut docs = vec![doc(json!({"id": 1})), doc(json!({"id": 3})), doc(json!({"id": 2}))];
        FindOptions::new()
            .sort_by(SortKey::desc("id"))
            .apply_sort(&mut docs);
        assert_eq!(docs[0]["id"], json!(3));
        assert_eq!(docs[2]["id"], json!(1));
    }
}
