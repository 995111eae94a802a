use clap::Parser;
use treeroute::cli::{run_cli, Cli};
use treeroute::logging::init_logging;
use treeroute::runtime_config::RuntimeConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&RuntimeConfig::from_env().log_config())?;
    run_cli(cli)
}
