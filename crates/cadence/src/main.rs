//! Cadence CLI binary.

use anyhow::Result;
use cadence::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the cadence CLI.
///
/// Commands run one after another against a single state blob, so the
/// current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=cadence=debug,cadence_blob=trace
    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cadence=info,cadence_blob=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting cadence CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Cadence CLI completed successfully");
    Ok(())
}
