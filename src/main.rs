use clap::Parser;
use std::process::ExitCode;

use no_push_oops::{Cli, Result};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cli.run().await
}
