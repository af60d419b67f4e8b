//! `picoclaw` -- the PicoClaw decision core binary.
//!
//! Runs as a subprocess of the gateway shell, speaking length-framed
//! JSON-RPC 2.0 on stdin/stdout. All diagnostics go to stderr; stdout
//! carries protocol frames only. Exits 0 on clean EOF of stdin and
//! non-zero on unrecoverable transport failures.

use clap::Parser;
use tracing::info;

use picoclaw_rpc::Runtime;

/// PicoClaw decision core (JSON-RPC over stdio).
#[derive(Parser)]
#[command(
    name = "picoclaw",
    about = "PicoClaw decision core (JSON-RPC over stdio)",
    version
)]
struct Cli {
    /// Enable verbose (debug-level) logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "picoclaw core starting");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let mut runtime = Runtime::new(stdin, stdout);
    runtime.run().await?;

    info!("picoclaw core exiting");
    Ok(())
}
