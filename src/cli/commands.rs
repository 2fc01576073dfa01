use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::RouterConfig;
use crate::host::{Host, SimulatedHost};
use crate::location::{make_query, parse_query, NavigationMode};
use crate::matcher::CompiledPattern;
use crate::router::Router;
use crate::table::{MountedRoute, RouteTable};

/// Command-line interface for brrtnav
///
/// Inspects patterns and query strings, and replays navigations against a
/// route table without a browser.
#[derive(Parser)]
#[command(name = "brrtnav")]
#[command(about = "brrtnav route inspection CLI", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Match a path against a route pattern and print the result as JSON
    Match {
        /// Route pattern, e.g. `/users/:id` or `/admin/*`
        #[arg(short, long)]
        pattern: String,

        /// Path to match
        #[arg(long)]
        path: String,
    },
    /// Parse a query string and print it as JSON and re-serialised
    Query {
        /// Query string without the leading `?`
        #[arg(long)]
        parse: String,
    },
    /// Mount a route table on a simulated browser and replay navigations
    Simulate {
        /// Route table file (YAML or JSON)
        #[arg(short, long)]
        routes: PathBuf,

        /// Navigation mode; overrides the table's `config.mode`
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Href to navigate to; repeat for several steps
        #[arg(long = "go")]
        go: Vec<String>,

        /// Initial document address
        #[arg(long, default_value = "https://app.test/")]
        address: String,
    },
}

/// Navigation modes selectable on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    History,
    Hash,
    Memory,
}

impl From<ModeArg> for NavigationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::History => NavigationMode::History,
            ModeArg::Hash => NavigationMode::Hash,
            ModeArg::Memory => NavigationMode::Memory,
        }
    }
}

/// Execute the CLI command, printing to stdout.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, a route table fails
/// to mount, or output cannot be written.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)
}

/// Execute a command, writing its report to `out`.
///
/// # Errors
///
/// See [`run_cli`].
pub fn execute(command: &Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Match { pattern, path } => {
            let compiled = CompiledPattern::new(pattern)
                .with_context(|| format!("invalid pattern '{pattern}'"))?;
            match compiled.match_path(path) {
                Some(m) => writeln!(out, "{}", serde_json::to_string_pretty(&m)?)?,
                None => writeln!(out, "no match")?,
            }
            Ok(())
        }
        Commands::Query { parse } => {
            let query = parse_query(parse.trim_start_matches('?'));
            writeln!(out, "{}", serde_json::to_string_pretty(&query)?)?;
            writeln!(out, "{}", make_query(&query))?;
            Ok(())
        }
        Commands::Simulate {
            routes,
            mode,
            go,
            address,
        } => simulate(routes, *mode, go, address, out),
    }
}

fn simulate(
    routes: &Path,
    mode: Option<ModeArg>,
    go: &[String],
    address: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let table = RouteTable::load(routes)?;
    let mut config: RouterConfig = table.config.clone().unwrap_or_default();
    if let Some(mode) = mode {
        config.mode = Some(mode.into());
    }

    let host: Rc<dyn Host> = Rc::new(
        SimulatedHost::new(address).with_context(|| format!("invalid address '{address}'"))?,
    );
    let router = Router::new(host, config)?;
    let mounted = table.mount(&router)?;
    router.settle();
    info!(routes = mounted.len(), mode = %router.mode(), "Simulation started");

    report(&router, &mounted, 0, out)?;
    for (i, href) in go.iter().enumerate() {
        if !router.goto(href, false) {
            writeln!(out, "(navigation to {href} ignored)")?;
        }
        router.settle();
        report(&router, &mounted, i + 1, out)?;
    }
    Ok(())
}

fn report(
    router: &Router,
    mounted: &[MountedRoute],
    step: usize,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let location = router.current_location();
    writeln!(out, "step {step}: {}", location.url)?;
    for route in mounted.iter().filter(|m| m.node.is_shown()) {
        writeln!(out, "  {}{}", "  ".repeat(route.depth), route.name)?;
    }
    match router.current_meta().get() {
        Some(meta) => writeln!(out, "  meta: {}", serde_json::to_string(meta.as_ref())?)?,
        None => writeln!(out, "  meta: none")?,
    }
    Ok(())
}
