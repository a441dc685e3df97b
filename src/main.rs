use clap::Parser;
use etf_discovery::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::SeedIndex => cli::seed::run().await,
        Command::CheckModel => cli::check::run().await,
    }
}
