use serde::{Deserialize, Serialize};

use crate::matcher::WILDCARD_SUFFIX;

/// Registration options of a route
///
/// `path` is relative to the parent route's pattern. A path ending in `/*`
/// makes the route non-exact, which is required for it to have children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub path: String,
    /// Redirect slug; absolute (`/login`) or relative to the parent pattern
    pub redirect: Option<String>,
    /// Only the first matching child is shown
    pub firstmatch: bool,
    /// Label appended to the breadcrumb trail when the route matches
    pub breadcrumb: Option<String>,
    /// Shown only when no sibling subtree matches
    pub fallback: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            path: WILDCARD_SUFFIX.to_string(),
            redirect: None,
            firstmatch: false,
            breadcrumb: None,
            fallback: false,
        }
    }
}

impl RouteOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Fallback route with the default `/*` path
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn redirect(mut self, slug: impl Into<String>) -> Self {
        self.redirect = Some(slug.into());
        self
    }

    #[must_use]
    pub fn firstmatch(mut self) -> Self {
        self.firstmatch = true;
        self
    }

    #[must_use]
    pub fn breadcrumb(mut self, label: impl Into<String>) -> Self {
        self.breadcrumb = Some(label.into());
        self
    }

    /// Whether the route only activates on a full match
    #[must_use]
    pub fn is_exact(&self) -> bool {
        !self.path.ends_with(WILDCARD_SUFFIX)
    }
}
