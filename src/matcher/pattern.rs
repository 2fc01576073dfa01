use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of path parameters before heap allocation.
/// Route patterns rarely nest more than a handful of `:param` segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Marker that turns a pattern into a prefix pattern.
pub const WILDCARD_SUFFIX: &str = "/*";

/// Leading marker of hash-navigation hrefs (`/#/users`).
const HASH_PREFIX: &str = "/#";

/// Stack-allocated parameter storage.
///
/// Param names use `Arc<str>`: they come from the compiled pattern and are
/// shared by every match produced from it.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Parameters captured by a match, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(ParamVec);

impl Params {
    /// Get a parameter by name
    ///
    /// Uses "last write wins" semantics: if a pattern declares the same name
    /// twice (`/org/:id/user/:id`), the last occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collapse into a map (last write wins for duplicate names)
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    pub(crate) fn push(&mut self, name: Arc<str>, value: String) {
        self.0.push((name, value));
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map = self.to_map();
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (k, v) in &map {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

/// Result of matching a path against a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathMatch {
    /// `true` iff the whole normalised path matched
    pub exact: bool,
    /// Captured `:param` segments
    pub params: Params,
    /// Portion of the path consumed by the match, without trailing slash
    #[serde(rename = "matchedPrefix")]
    pub matched_prefix: String,
}

/// Normalise a path or pattern.
///
/// Strips a leading `/#` and a trailing `/*`, ensures a leading slash and
/// collapses the root to `""`. With `slash` set, a trailing slash is added so
/// that prefix comparisons stop on segment boundaries.
#[must_use]
pub fn format_path(path: &str, slash: bool) -> String {
    let path = path.strip_prefix(HASH_PREFIX).unwrap_or(path);
    let path = path.strip_suffix(WILDCARD_SUFFIX).unwrap_or(path);

    let mut out = String::with_capacity(path.len() + 2);
    if !path.starts_with('/') {
        out.push('/');
    }
    out.push_str(path);
    if out == "/" {
        out.clear();
    }
    if slash && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// A route pattern compiled into anchored regexes
///
/// Compile once per route and reuse for every location change.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Normalised pattern (no trailing slash, wildcard stripped)
    pattern: String,
    /// Whether the source pattern ended in `/*`
    wildcard: bool,
    exact_re: Regex,
    prefix_re: Regex,
    param_names: Vec<Arc<str>>,
}

impl CompiledPattern {
    /// Compile a pattern such as `/users/:id` or `/admin/*`
    ///
    /// Literal segments are escaped, so the only way this fails is a regex
    /// size limit on absurdly long patterns.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let wildcard = pattern.ends_with(WILDCARD_SUFFIX);
        let with_slash = format_path(pattern, true);

        let mut param_names = Vec::with_capacity(with_slash.matches(':').count());
        let body = with_slash
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => {
                    param_names.push(Arc::<str>::from(name));
                    "([^/]+)".to_string()
                }
                None => regex::escape(segment),
            })
            .collect::<Vec<_>>()
            .join("/");

        let exact_re = Regex::new(&format!("^{body}$"))?;
        let prefix_re = Regex::new(&format!("^{body}"))?;

        Ok(Self {
            pattern: format_path(pattern, false),
            wildcard,
            exact_re,
            prefix_re,
            param_names,
        })
    }

    /// Normalised pattern text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Match a path against this pattern
    ///
    /// # Returns
    ///
    /// * `Some(PathMatch)` with `exact = true` for a full match
    /// * `Some(PathMatch)` with `exact = false` for a prefix match
    /// * `None` if the path does not start with the pattern
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathMatch> {
        let path = format_path(path, true);

        let (captures, exact) = match self.exact_re.captures(&path) {
            Some(c) if !self.wildcard => (c, true),
            _ => (self.prefix_re.captures(&path)?, false),
        };

        let mut params = Params::default();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                params.push(Arc::clone(name), value.as_str().to_string());
            }
        }

        let whole = captures.get(0).map_or("", |m| m.as_str());
        let matched_prefix = whole.strip_suffix('/').unwrap_or(whole).to_string();

        debug!(
            pattern = %self.pattern,
            path = %path,
            exact,
            matched_prefix = %matched_prefix,
            "Pattern matched"
        );

        Some(PathMatch {
            exact,
            params,
            matched_prefix,
        })
    }
}

/// Match `path` against `pattern` in one step
///
/// Compiles the pattern on every call; routes keep a [`CompiledPattern`]
/// instead.
#[must_use]
pub fn match_path(pattern: &str, path: &str) -> Option<PathMatch> {
    CompiledPattern::new(pattern).ok()?.match_path(path)
}
