//! # Query Shim
//!
//! Translates a small, fixed subset of SQL-like templates into native
//! document-store calls.
//!
//! Recognised shapes:
//!
//! - `SELECT NOW()` / `SELECT 1`: connectivity probe
//! - `SELECT <expr>` with no `FROM`: connection test row
//! - `SELECT COUNT(*) FROM ${collection} [WHERE field = ${value}]`
//! - `SELECT <fields|*> FROM ${collection} [WHERE field = ${value}] [ORDER BY f [ASC|DESC], ...]`
//!
//! The collection name is always the first substituted value. Only a single
//! equality predicate is understood; joins, `AND`/`OR` and every other clause
//! are ignored.

pub mod errors;
pub mod template;

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use serde_json::{json, Value};

use crate::store::{Document, DocumentStore, Filter, FindOptions, SortKey};

pub use errors::{ShimError, ShimResult};
pub use template::{SqlTemplate, SqlTemplateBuilder};

/// Marker substituted for each value slot before pattern matching
const PLACEHOLDER: &str = "PLACEHOLDER";

/// A template translated into a native store call
#[derive(Debug, Clone, PartialEq)]
pub enum ShimQuery {
    /// `SELECT NOW()` / `SELECT 1`
    Ping,
    /// `SELECT` without `FROM`
    ConnectionTest,
    /// `SELECT COUNT(*) FROM ...`
    Count { collection: String, filter: Filter },
    /// `SELECT ... FROM ...`
    Find {
        collection: String,
        filter: Filter,
        options: FindOptions,
    },
}

struct Patterns {
    ping: Regex,
    select: Regex,
    from_keyword: Regex,
    from_slot: Regex,
    count: Regex,
    projection: Regex,
    where_clause: Regex,
    equality: Regex,
    order_by: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("static shim pattern");
        Patterns {
            ping: compile(r"(?i)SELECT\s+(?:NOW\(\)|1\b)"),
            select: compile(r"(?i)\bSELECT\b"),
            from_keyword: compile(r"(?i)\bFROM\b"),
            from_slot: compile(&format!(r"(?i)FROM\s+{}", PLACEHOLDER)),
            count: compile(r"(?i)\bCOUNT\s*\("),
            projection: compile(r"(?i)SELECT\s+(.+?)\s+FROM"),
            where_clause: compile(r"(?i)WHERE\s+(.+?)(?:\s+ORDER\s+BY|\s*$)"),
            equality: compile(&format!(r"(?i)(\w+)\s*=\s*{}", PLACEHOLDER)),
            order_by: compile(r"(?i)ORDER\s+BY\s+(.+?)\s*$"),
        }
    })
}

/// Translate a template into a store call
pub fn translate(template: &SqlTemplate) -> ShimResult<ShimQuery> {
    let p = patterns();
    let joined = template.joined();

    if p.ping.is_match(&joined) {
        return Ok(ShimQuery::Ping);
    }
    if p.select.is_match(&joined) && !p.from_keyword.is_match(&joined) {
        return Ok(ShimQuery::ConnectionTest);
    }

    let text = template.with_markers(PLACEHOLDER);
    let values = template.values();
    let mut next_value = 0;

    let collection = if p.from_slot.is_match(&text) && !values.is_empty() {
        next_value += 1;
        match &values[0] {
            Value::String(name) if name.is_empty() => return Err(ShimError::NoCollection),
            Value::String(name) => name.clone(),
            other => return Err(ShimError::CollectionNotString(other.clone())),
        }
    } else {
        return Err(ShimError::NoCollection);
    };

    let filter = equality_filter(&text, values, &mut next_value);

    if p.count.is_match(&text) {
        return Ok(ShimQuery::Count { collection, filter });
    }

    let mut options = FindOptions::new();
    if let Some(fields) = p.projection.captures(&text).map(|c| c[1].trim().to_string()) {
        if fields != "*" {
            options = options.project(fields.split(',').map(|f| f.trim().to_string()));
        }
    }
    if let Some(caps) = p.order_by.captures(&text) {
        for key in caps[1].split(',').filter_map(parse_sort_key) {
            options = options.sort_by(key);
        }
    }

    Ok(ShimQuery::Find {
        collection,
        filter,
        options,
    })
}

/// Extract the single `field = ${value}` clause from `WHERE`
fn equality_filter(text: &str, values: &[Value], next_value: &mut usize) -> Filter {
    let p = patterns();
    let Some(clause) = p.where_clause.captures(text) else {
        return Filter::all();
    };
    if *next_value >= values.len() {
        return Filter::all();
    }
    match p.equality.captures(&clause[1]) {
        Some(eq) => {
            let filter = Filter::eq(&eq[1], values[*next_value].clone());
            *next_value += 1;
            filter
        }
        None => Filter::all(),
    }
}

fn parse_sort_key(item: &str) -> Option<SortKey> {
    let mut tokens = item.split_whitespace();
    let field = tokens.next()?;
    match tokens.next() {
        Some(dir) if dir.eq_ignore_ascii_case("desc") => Some(SortKey::desc(field)),
        _ => Some(SortKey::asc(field)),
    }
}

/// Executes templates against a document store
#[derive(Clone)]
pub struct QueryShim {
    store: Arc<dyn DocumentStore>,
}

impl QueryShim {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Translate and run a template
    pub fn query(&self, template: &SqlTemplate) -> ShimResult<Vec<Document>> {
        let query = translate(template)?;
        tracing::debug!(template = %template.with_markers("?"), ?query, "shim query");
        self.execute(&query)
    }

    /// Run a translated query
    pub fn execute(&self, query: &ShimQuery) -> ShimResult<Vec<Document>> {
        match query {
            ShimQuery::Ping => {
                self.store.ping()?;
                Ok(vec![row(json!({
                    "current_time": Utc::now().to_rfc3339(),
                    "message": "Database connected!",
                }))])
            }
            ShimQuery::ConnectionTest => {
                self.store.ping()?;
                Ok(vec![row(json!({ "connection_test": 1 }))])
            }
            ShimQuery::Count { collection, filter } => {
                let count = self.count(collection, filter)?;
                Ok(vec![row(json!({ "count": count }))])
            }
            ShimQuery::Find {
                collection,
                filter,
                options,
            } => self.find(collection, filter, options),
        }
    }

    /// Native find
    pub fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> ShimResult<Vec<Document>> {
        let docs = self.store.find(collection, filter, options)?;
        tracing::debug!(collection, results = docs.len(), "find");
        Ok(docs)
    }

    /// Native count
    pub fn count(&self, collection: &str, filter: &Filter) -> ShimResult<u64> {
        let count = self.store.count(collection, filter)?;
        tracing::debug!(collection, count, "count");
        Ok(count)
    }
}

fn row(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
