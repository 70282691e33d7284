use clap::Parser;
use tracing_subscriber::EnvFilter;

use tallymap::cli::{execute_command, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    execute_command(&cli);
}
