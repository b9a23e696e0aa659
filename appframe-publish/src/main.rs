use anyhow::Result;
use appframe_publish::cli::{run, Cli};
use appframe_publish::logging;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so RUST_LOG and the APPFRAME_* credentials can come from it
    dotenvy::dotenv().ok();
    logging::init()?;

    let cli = Cli::parse();
    tracing::debug!("CLI arguments parsed, invoking run");
    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "appframe-publish exited with error");
    }
    result
}
