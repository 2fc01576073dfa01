//! # Route Tables
//!
//! Declarative route trees, mounted onto a [`Router`] in one call. The CLI's
//! `simulate` command is built on these; an application can use them to keep
//! its route layout in a file.
//!
//! ```yaml
//! config:
//!   mode: memory
//! routes:
//!   - path: /
//!     redirect: /users
//!   - name: users
//!     path: /users/*
//!     breadcrumb: Users
//!     firstmatch: true
//!     children:
//!       - path: /new
//!       - path: /:id
//!   - name: not-found
//!     fallback: true
//! ```
//!
//! Every key of an entry except `name` and `children` is a [`RouteOptions`]
//! field. Entries without a `name` are named after their resolved pattern.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::route::{RouteNode, RouteOptions};
use crate::router::Router;

/// One route of a table and its nested routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub options: RouteOptions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteEntry>,
}

/// A route tree plus optional router settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub config: Option<RouterConfig>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// A registered table entry
#[derive(Debug, Clone)]
pub struct MountedRoute {
    pub name: String,
    /// Nesting depth, `0` for top-level routes
    pub depth: usize,
    pub node: RouteNode,
}

impl RouteTable {
    /// Parse a YAML table.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidConfig`] when the document is malformed.
    pub fn from_yaml_str(s: &str) -> Result<Self, RouterError> {
        serde_yaml::from_str(s).map_err(|e| RouterError::InvalidConfig(e.to_string()))
    }

    /// Read a table from a `.yaml`/`.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read route table {}", path.display()))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let table = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse route table {}", path.display()))?
        } else {
            Self::from_yaml_str(&content)
                .with_context(|| format!("failed to parse route table {}", path.display()))?
        };
        Ok(table)
    }

    /// Number of entries, nested ones included
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(entries: &[RouteEntry]) -> usize {
            entries.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.routes)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register every entry, parents before children, in table order.
    ///
    /// Routes are registered with no-op outlets; watch them through
    /// [`RouteNode::state`] and [`RouteNode::meta`].
    ///
    /// # Errors
    ///
    /// The first registration error, e.g. children under an exact route.
    /// Routes registered before the failure stay registered.
    pub fn mount(&self, router: &Router) -> Result<Vec<MountedRoute>, RouterError> {
        let mut mounted = Vec::with_capacity(self.len());
        mount_entries(&router.root(), &self.routes, 0, &mut mounted)?;
        info!(routes = mounted.len(), "Route table mounted");
        Ok(mounted)
    }
}

fn mount_entries(
    parent: &RouteNode,
    entries: &[RouteEntry],
    depth: usize,
    out: &mut Vec<MountedRoute>,
) -> Result<(), RouterError> {
    for entry in entries {
        let node = parent.register(entry.options.clone(), std::rc::Rc::new(()))?;
        let name = entry.name.clone().unwrap_or_else(|| match node.pattern() {
            p if p.is_empty() => "/".to_string(),
            p => p,
        });
        out.push(MountedRoute {
            name,
            depth,
            node: node.clone(),
        });
        mount_entries(&node, &entry.children, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Host, SimulatedHost};
    use crate::location::NavigationMode;
    use std::rc::Rc;

    const TABLE: &str = r"
config:
  mode: memory
routes:
  - path: /
    redirect: /users
  - name: users
    path: /users/*
    breadcrumb: Users
    firstmatch: true
    children:
      - path: /new
      - name: user
        path: /:id
  - name: not-found
    fallback: true
";

    fn router(table: &RouteTable) -> Router {
        let host: Rc<dyn Host> = Rc::new(SimulatedHost::new("https://app.test/").unwrap());
        Router::new(host, table.config.clone().unwrap_or_default()).unwrap()
    }

    #[test]
    fn test_parse_table() {
        let table = RouteTable::from_yaml_str(TABLE).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.config.as_ref().unwrap().mode, Some(NavigationMode::Memory));

        let users = &table.routes[1];
        assert_eq!(users.name.as_deref(), Some("users"));
        assert_eq!(users.options.path, "/users/*");
        assert!(users.options.firstmatch);
        assert_eq!(users.children.len(), 2);

        let fallback = &table.routes[2];
        assert!(fallback.options.fallback);
        assert_eq!(fallback.options.path, "/*");
    }

    #[test]
    fn test_parse_error() {
        let err = RouteTable::from_yaml_str("routes: 12").unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfig(_)));
    }

    #[test]
    fn test_mount_and_navigate() {
        let table = RouteTable::from_yaml_str(TABLE).unwrap();
        let router = router(&table);
        let mounted = table.mount(&router).unwrap();
        assert_eq!(mounted.len(), 5);
        assert_eq!(mounted[0].name, "/");
        assert_eq!(mounted[2].name, "/users/new");
        assert_eq!(mounted[3].depth, 1);

        // the index route redirected on mount
        assert_eq!(router.current_location().path, "/users");

        router.goto("/users/new", false);
        router.settle();
        let shown: Vec<&str> = mounted
            .iter()
            .filter(|m| m.node.is_shown())
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(shown, vec!["users", "/users/new"]);

        router.goto("/nowhere", false);
        router.settle();
        let shown: Vec<&str> = mounted
            .iter()
            .filter(|m| m.node.is_shown())
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(shown, vec!["not-found"]);
    }

    #[test]
    fn test_mount_rejects_children_of_exact_route() {
        let table = RouteTable::from_yaml_str(
            "routes:\n  - path: /exact\n    children:\n      - path: /child\n",
        )
        .unwrap();
        let router = router(&table);
        let err = table.mount(&router).unwrap_err();
        assert!(matches!(err, RouterError::NestedUnderExact { .. }));
    }
}
