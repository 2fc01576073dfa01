//! # CLI Module
//!
//! Command-line access to the matcher, the query codec and the route tree.
//!
//! ## Commands
//!
//! ### `match`
//!
//! Match a path against a pattern:
//!
//! ```bash
//! brrtnav match --pattern '/users/:id' --path /users/42
//! ```
//!
//! Prints the `PathMatch` as JSON, or `no match`.
//!
//! ### `query`
//!
//! ```bash
//! brrtnav query --parse 'tag=a,b&debug'
//! ```
//!
//! Prints the parsed query as JSON followed by its re-serialisation.
//!
//! ### `simulate`
//!
//! Mount a route table on a simulated browser and replay navigations,
//! settling after each one:
//!
//! ```bash
//! brrtnav simulate --routes routes.yaml --mode memory --go /users/7 --go /nowhere
//! ```
//!
//! Each step prints the url, the visible routes (indented by depth) and the
//! current meta.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use brrtnav::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands, ModeArg};
