use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pingwatch")]
#[command(version = concat!("Ver:", env!("CARGO_PKG_VERSION")))]
#[command(about = "Declarative service-availability monitor")]
pub struct Cli {
    /// Path to the configuration document, overriding CONFIG_FILE and the
    /// default search order
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Load and validate configuration, print a summary, then exit without
    /// starting the probe loop
    #[arg(long = "validate-only")]
    pub validate_only: bool,

    /// Run exactly one cycle, then exit
    #[arg(long = "once")]
    pub once: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
