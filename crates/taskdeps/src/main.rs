//! taskdeps CLI binary.

use anyhow::Result;
use taskdeps::cli::Cli;
use taskdeps::error::Error;
use tracing_subscriber::EnvFilter;

/// Main entry point for the taskdeps CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Example: RUST_LOG=taskdeps=debug taskdeps view p1
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskdeps=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting taskdeps CLI");

    let cli = Cli::parse_args();
    if let Err(err) = cli.execute().await {
        // Domain errors carry a stable code for scripts
        match err.downcast_ref::<Error>() {
            Some(domain) => eprintln!("Error [{}]: {domain}", domain.code()),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }

    tracing::debug!("taskdeps CLI completed successfully");
    Ok(())
}
