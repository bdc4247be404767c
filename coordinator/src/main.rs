use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use coordinator::{CoordinatorConfig, JobSpec};

#[derive(Parser)]
#[command(name = "coordinator")]
#[command(about = "Coordinator de un job MapReduce")]
struct Args {
    /// Cantidad de reducers (particiones de salida)
    #[arg(value_name = "REDUCERS")]
    reducers: u32,

    /// Archivos de entrada o patrones glob, uno por split
    #[arg(value_name = "INPUTS", required = true)]
    inputs: Vec<String>,

    /// Dirección donde escuchar (pisa COORDINATOR_ADDR)
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coordinator=debug,axum=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = CoordinatorConfig::from_env();
    if let Some(addr) = args.addr {
        config.addr = addr;
    }

    let job = JobSpec::from_patterns(&args.inputs, args.reducers)?;

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("no se pudo escuchar en {}", config.addr))?;

    coordinator::serve(listener, job, config).await?;
    Ok(())
}
