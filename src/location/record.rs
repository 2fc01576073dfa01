use serde::Serialize;

use super::query::{make_query, parse_query, Query};

/// Immutable snapshot of the current address
///
/// `path` never contains `?` or `#`. Records are replaced, never mutated; the
/// store hands out `Rc<Location>` so unchanged reads are pointer-equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Full virtual url (`/users/42?tab=posts#top`)
    pub url: String,
    /// Path without query or hash
    pub path: String,
    pub query: Query,
    /// Fragment without the leading `#`
    pub hash: String,
    /// Previous url, absent for the initial location
    pub from: Option<String>,
}

impl Location {
    /// Decompose a virtual url into path, query and hash
    #[must_use]
    pub fn parse(url: &str, from: Option<String>) -> Self {
        let (rest, hash) = match url.split_once('#') {
            Some((rest, hash)) => (rest, hash),
            None => (url, ""),
        };
        let (path, raw_query) = match rest.split_once('?') {
            Some((path, q)) => (path, q),
            None => (rest, ""),
        };

        Self {
            url: url.to_string(),
            path: path.to_string(),
            query: parse_query(raw_query),
            hash: hash.to_string(),
            from,
        }
    }

    /// Rebuild an href from path, query and hash
    #[must_use]
    pub fn to_href(&self) -> String {
        build_href(&self.path, &self.query, &self.hash)
    }
}

/// `path + "?" + query + "#" + hash`, omitting empty parts
#[must_use]
pub fn build_href(path: &str, query: &Query, hash: &str) -> String {
    let mut href = path.to_string();
    let query = make_query(query);
    if !query.is_empty() {
        href.push('?');
        href.push_str(&query);
    }
    if !hash.is_empty() {
        href.push('#');
        href.push_str(hash);
    }
    href
}

/// Partial location used by `LocationStore::set`
///
/// A patch without `path` refines the current entry and is applied as a
/// replace navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub path: Option<String>,
    pub query: Option<Query>,
    pub hash: Option<String>,
}

impl LocationPatch {
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}
