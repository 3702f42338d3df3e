//! ATD CLI - airport taxi demand forecasts from the command line.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "atd-cli",
    version,
    about = "Airport taxi demand forecast toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: atd_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    atd_cmd::run(cli.command)
}
