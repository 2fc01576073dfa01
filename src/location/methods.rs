//! Query and fragment helpers
//!
//! Each mutation builds a new href from the current path and navigates with
//! replace semantics, so refining the query never adds a history entry.

use super::query::{Query, QueryValue};
use super::record::LocationPatch;
use super::store::LocationStore;

impl LocationStore {
    /// Value of one query parameter
    #[must_use]
    pub fn query_get(&self, name: &str) -> Option<QueryValue> {
        self.get().query.get(name).cloned()
    }

    /// The whole query mapping
    #[must_use]
    pub fn query_all(&self) -> Query {
        self.get().query.clone()
    }

    /// Set one parameter, keeping the others
    pub fn query_set(&self, name: &str, value: impl Into<QueryValue>) -> bool {
        let mut query = self.query_all();
        query.insert(name, value);
        self.set(LocationPatch::default().query(query))
    }

    /// Remove one parameter
    pub fn query_delete(&self, name: &str) -> bool {
        let mut query = self.query_all();
        if query.remove(name).is_none() {
            return false;
        }
        self.set(LocationPatch::default().query(query))
    }

    /// Replace the whole query
    pub fn query_replace(&self, query: Query) -> bool {
        self.set(LocationPatch::default().query(query))
    }

    pub fn query_clear(&self) -> bool {
        self.query_replace(Query::new())
    }

    /// Fragment without `#`
    #[must_use]
    pub fn hash_get(&self) -> String {
        self.get().hash.clone()
    }

    pub fn hash_set(&self, hash: &str) -> bool {
        self.set(LocationPatch::default().hash(hash.trim_start_matches('#')))
    }

    pub fn hash_clear(&self) -> bool {
        self.hash_set("")
    }
}
