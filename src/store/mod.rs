//! # Credential Store
//!
//! Collection-per-role document storage. Each role (`admin`, `teacher`,
//! `student`, `staff`) has its own collection of login records; non-credential
//! data such as `grade` lives alongside them.
//!
//! Backends: [`MongoStore`] for `mongodb://` deployments, [`MemoryStore`] for
//! the built-in demo data and JSON files.

pub mod document;
pub mod errors;
pub mod memory;
pub mod mongo;
pub mod seed;

pub use document::{Document, Filter, FindOptions, SortDirection, SortKey, ID_FIELD};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::{is_mongodb_uri, MongoStore};

/// Document store backend
pub trait DocumentStore: Send + Sync {
    /// Find documents matching a filter
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Count documents matching a filter
    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Connectivity probe
    fn ping(&self) -> StoreResult<()>;

    /// Names of all collections
    fn collection_names(&self) -> StoreResult<Vec<String>>;
}
