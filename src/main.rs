//! gitrel - tag, build and publish a GitHub release with a single command

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitrel::cli::{auth, release, Cli, Commands};
use gitrel::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // -v raises our own spans to info; RUST_LOG still wins when set
    let default_filter = if cli.verbose { "gitrel=info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Release(args) => release::handle_release(args).await,
        Commands::Auth(args) => auth::handle_auth(args.command).await,
    }
}
