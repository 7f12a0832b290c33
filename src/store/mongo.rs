//! # MongoDB Document Store
//!
//! `DocumentStore` over the MongoDB driver's blocking API. The client
//! connects lazily, so an unreachable server surfaces on the first query
//! rather than at startup.
//!
//! Calls block the current thread; async callers run them on the blocking
//! pool.

use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::sync::{Client, Collection, Database};
use serde_json::Value;

use super::document::{Document, Filter, FindOptions, SortDirection, SortKey, ID_FIELD};
use super::errors::{StoreError, StoreResult};
use super::DocumentStore;

/// URI schemes handled by the MongoDB driver
pub const MONGODB_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

/// Whether a store URI points at a MongoDB deployment
pub fn is_mongodb_uri(uri: &str) -> bool {
    MONGODB_SCHEMES.iter().any(|s| uri.starts_with(s))
}

/// Collection-per-role store backed by a MongoDB database
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Parse `uri` and select `database`
    pub fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)?;
        tracing::info!(database, "MongoDB client configured");
        Ok(Self {
            db: client.database(database),
        })
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.db.collection::<BsonDocument>(name)
    }
}

impl DocumentStore for MongoStore {
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter_document(filter)?);
        if !options.sort.is_empty() {
            action = action.sort(sort_document(&options.sort));
        }
        if let Some(fields) = &options.projection {
            action = action.projection(projection_document(fields));
        }

        let cursor = action.run()?;
        let mut docs = Vec::new();
        for row in cursor {
            docs.push(to_json_document(row?)?);
        }
        tracing::debug!(collection, count = docs.len(), "mongodb find");
        Ok(docs)
    }

    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        Ok(self
            .collection(collection)
            .count_documents(filter_document(filter)?)
            .run()?)
    }

    fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).run()?;
        Ok(())
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let mut names = self.db.list_collection_names().run()?;
        names.sort();
        Ok(names)
    }
}

/// Equality clauses as a query document
fn filter_document(filter: &Filter) -> StoreResult<BsonDocument> {
    bson::to_document(filter.clauses()).map_err(|e| StoreError::malformed(e.to_string()))
}

fn sort_document(keys: &[SortKey]) -> BsonDocument {
    keys.iter()
        .map(|key| {
            let direction = match key.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            (key.field.clone(), Bson::Int32(direction))
        })
        .collect()
}

fn projection_document(fields: &[String]) -> BsonDocument {
    fields
        .iter()
        .map(|field| (field.clone(), Bson::Int32(1)))
        .collect()
}

/// Convert a driver document to JSON, with an ObjectId `_id` as its hex string
fn to_json_document(mut row: BsonDocument) -> StoreResult<Document> {
    if let Some(Bson::ObjectId(oid)) = row.get(ID_FIELD) {
        let hex = oid.to_hex();
        row.insert(ID_FIELD, hex);
    }
    match Bson::Document(row).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::malformed(format!(
            "expected a document, got {other}"
        ))),
    }
}
