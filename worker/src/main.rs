use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use common::workload;
use worker::{Worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "worker")]
#[command(about = "Worker MapReduce")]
struct Args {
    /// Aplicación a ejecutar (wc, inverted-index, wc-with-fails)
    #[arg(long, default_value = "wc")]
    workload: String,

    /// URL del coordinator (pisa COORDINATOR_URL)
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("worker=debug,reqwest=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = WorkerConfig::from_env();
    if let Some(url) = args.url {
        config.coordinator_url = url;
    }

    let app = workload::named(&args.workload)?;
    Worker::new(config, app).run().await?;
    Ok(())
}
