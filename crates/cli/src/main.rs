//! s3up - upload a directory tree to S3
//!
//! Uploads every matching file under a local directory to an S3-compatible
//! bucket, keeping the relative layout under a key prefix.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use s3up_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Structured logs go to stderr; user-facing output is printed by the formatter
    // RUST_LOG wins over --debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
