use serde::{Deserialize, Serialize};

use crate::location::Query;
use crate::matcher::Params;

/// One entry of a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Label given at registration
    pub name: String,
    /// Matched prefix of the route that added the entry
    pub path: String,
}

/// Read-only record derived for a matched route
///
/// Absent meta (`None`) means the route does not match; it is never an empty
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub from: Option<String>,
    pub url: String,
    pub query: Query,
    /// Matched prefix of the path
    #[serde(rename = "match")]
    pub matched: String,
    /// Resolved pattern of the route
    pub pattern: String,
    /// Parent trail plus this route's label, if any
    pub breadcrumbs: Vec<Breadcrumb>,
    pub params: Params,
}
