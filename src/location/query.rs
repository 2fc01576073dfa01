use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A single query value
///
/// `flag` serialises as the bare name (`?debug`), `Many` as a comma-joined
/// list (`?tag=a,b`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Name present without `=`; `false` is dropped on serialisation
    Flag(bool),
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First (or only) string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Flag(_) => None,
            QueryValue::One(v) => Some(v),
            QueryValue::Many(v) => v.first().map(String::as_str),
        }
    }

    #[must_use]
    pub fn is_flag(&self) -> bool {
        matches!(self, QueryValue::Flag(true))
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::One(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::One(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Flag(v)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(v: Vec<String>) -> Self {
        QueryValue::Many(v)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(v: Vec<&str>) -> Self {
        QueryValue::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Query string as an ordered name → value mapping
///
/// Insertion order is preserved so that serialisation is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, QueryValue>")]
pub struct Query(Vec<(String, QueryValue)>);

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Insert or replace a value, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<QueryValue> {
        let idx = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<std::collections::BTreeMap<String, QueryValue>> for Query {
    fn from(map: std::collections::BTreeMap<String, QueryValue>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut q = Query::new();
        for (k, v) in iter {
            q.insert(k, v);
        }
        q
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

/// Parse a raw query string (without the leading `?`)
///
/// - `flag` (no `=`) becomes `Flag(true)`
/// - for `a=b=c` the last `=` part is the value
/// - a value containing `,` is split into several values
/// - repeated names accumulate into `Many`
/// - pairs with an empty name are skipped
///
/// A name seen both bare and with values keeps only the values.
#[must_use]
pub fn parse_query(raw: &str) -> Query {
    struct Acc {
        values: Vec<String>,
        flag: bool,
    }

    let mut acc: Vec<(String, Acc)> = Vec::new();
    for pair in raw.split('&') {
        let mut parts = pair.split('=');
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let value = parts.last();

        let idx = match acc.iter().position(|(k, _)| k == name) {
            Some(idx) => idx,
            None => {
                acc.push((
                    name.to_string(),
                    Acc {
                        values: Vec::new(),
                        flag: false,
                    },
                ));
                acc.len() - 1
            }
        };
        let entry = &mut acc[idx].1;
        match value {
            Some(v) if v.contains(',') => entry.values.extend(v.split(',').map(str::to_string)),
            Some(v) => entry.values.push(v.to_string()),
            None => entry.flag = true,
        }
    }

    Query(
        acc.into_iter()
            .map(|(name, mut a)| {
                let value = match a.values.len() {
                    0 => QueryValue::Flag(a.flag),
                    1 => QueryValue::One(a.values.remove(0)),
                    _ => QueryValue::Many(a.values),
                };
                (name, value)
            })
            .collect(),
    )
}

/// Serialise a query back to `name=value` pairs joined by `&`
///
/// Empty and `false` values are omitted, `true` becomes the bare name and
/// multi-values are joined by `,`.
#[must_use]
pub fn make_query(query: &Query) -> String {
    query
        .iter()
        .filter_map(|(name, value)| match value {
            QueryValue::Flag(true) => Some(name.to_string()),
            QueryValue::Flag(false) => None,
            QueryValue::One(v) if v.is_empty() => None,
            QueryValue::One(v) => Some(format!("{name}={v}")),
            QueryValue::Many(v) if v.is_empty() => None,
            QueryValue::Many(v) => Some(format!("{name}={}", v.join(","))),
        })
        .collect::<Vec<_>>()
        .join("&")
}
