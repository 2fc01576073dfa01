use brrtnav::cli::{run_cli, Cli};
use brrtnav::logging::{init_logging, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    let cli = Cli::parse();
    run_cli(cli)
}
