use clap::Parser;

mod commands;
mod logging;
mod sample;

use commands::Commands;

#[derive(Parser, Debug)]
#[command(name = "peercache")]
#[command(about = "Distributed read-through cache node", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    logging::init()?;

    let cli = Cli::parse();
    cli.command.execute().await
}
