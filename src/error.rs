use std::fmt;

/// Router configuration error
///
/// Returned synchronously by route registration and by the ambient meta
/// accessor. A location that matches nothing is not an error; it is reported
/// as `None`/hidden state instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A route was registered under a parent that only matches exactly
    ///
    /// Exact routes cannot have children: nothing below them could ever match.
    NestedUnderExact {
        /// Resolved pattern of the exact parent
        parent: String,
        /// Path the child tried to register with
        child: String,
    },
    /// A route was registered under a fallback route
    NestedUnderFallback {
        /// Resolved pattern of the fallback parent
        parent: String,
        /// Path the child tried to register with
        child: String,
    },
    /// The meta accessor was used outside of any route subtree
    OutsideRoute,
    /// The node was already unregistered
    Detached {
        /// Resolved pattern of the detached node
        pattern: String,
    },
    /// Invalid router configuration or route table
    InvalidConfig(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NestedUnderExact { parent, child } => {
                write!(
                    f,
                    "route configuration error: cannot nest '{}' under exact route '{}'. \
                    Add a trailing '/*' to the parent path to allow child routes.",
                    child, parent
                )
            }
            RouterError::NestedUnderFallback { parent, child } => {
                write!(
                    f,
                    "route configuration error: cannot nest '{}' under fallback route '{}'.",
                    child, parent
                )
            }
            RouterError::OutsideRoute => {
                write!(
                    f,
                    "route configuration error: meta() must be called inside a route subtree"
                )
            }
            RouterError::Detached { pattern } => {
                write!(f, "route '{}' has already been unregistered", pattern)
            }
            RouterError::InvalidConfig(msg) => write!(f, "invalid router configuration: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}
