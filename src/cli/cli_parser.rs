use clap::Parser;
use std::path::PathBuf;

use crate::cli::Commands;

#[derive(Parser)]
#[command(
    // Obtain during build time, not runtime
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
pub struct Cli {
    /// Configuration file describing the table geometry, counter fields,
    /// and backing file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "./config.ini",
        help = "Path to the INI configuration file."
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}
