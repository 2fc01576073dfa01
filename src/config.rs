//! # Router Configuration
//!
//! [`RouterConfig`] can be built in code, loaded from environment variables or
//! read from a TOML file.
//!
//! ## Environment Variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `BRRTNAV_MODE` | `history`, `hash` or `memory` | host default |
//! | `BRRTNAV_BASE` | path prefix for history mode | `""` |
//! | `BRRTNAV_INTERCEPT_CLICKS` | attach the link click interceptor | `true` |
//! | `BRRTNAV_MAX_REDIRECTS` | redirects allowed per navigation chain | `10` |
//!
//! Unparsable values fall back to the defaults.
//!
//! ## TOML
//!
//! ```toml
//! mode = "hash"
//! base = "/app"
//! intercept_clicks = false
//! max_redirects = 5
//! ```

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::RouterError;
use crate::location::NavigationMode;

/// Default bound on redirects within one navigation chain
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Navigation mode; `None` picks memory inside `srcdoc` documents and
    /// history everywhere else
    pub mode: Option<NavigationMode>,
    /// Path prefix the app is served under (history mode)
    pub base: String,
    /// Turn same-origin link clicks into in-process navigations
    pub intercept_clicks: bool,
    /// Redirects allowed before a chain is cut off
    pub max_redirects: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: None,
            base: String::new(),
            intercept_clicks: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode: env::var("BRRTNAV_MODE")
                .ok()
                .and_then(|v| NavigationMode::parse(&v)),
            base: env::var("BRRTNAV_BASE").unwrap_or(defaults.base),
            intercept_clicks: env::var("BRRTNAV_INTERCEPT_CLICKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.intercept_clicks),
            max_redirects: env::var("BRRTNAV_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects),
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidConfig`] on malformed TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self, RouterError> {
        toml::from_str(s).map_err(|e| RouterError::InvalidConfig(e.to_string()))
    }

    /// Read a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router config {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("failed to parse router config {}", path.display()))
    }
}
