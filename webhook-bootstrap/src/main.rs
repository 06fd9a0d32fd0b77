use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "webhook-receiver")]
#[command(about = "Signed webhook receiver", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = webhook_bootstrap::init_tracing()?;

    let args = Args::parse();
    webhook_bootstrap::run_standalone(args.config).await
}
