use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::{config::env_string, engine, results, workload, JobProgress};
use reqwest::Client;

/// Igual que en el worker:
/// - COORDINATOR_URL si está definida
/// - si no, http://127.0.0.1:8080
fn coordinator_base_url() -> String {
    env_string("COORDINATOR_URL", "http://127.0.0.1:8080")
}

#[derive(Parser)]
#[command(name = "mrctl")]
#[command(about = "CLI para consultar el coordinator y validar resultados")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta el progreso del job en curso
    Status,

    /// Corre el job en un solo proceso (referencia) y deja un único archivo de salida
    Sequential {
        #[arg(long, default_value = "wc")]
        workload: String,

        #[arg(long, default_value = "output/mr-out-0")]
        output: PathBuf,

        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<String>,
    },

    /// Compara los mr-out-* de una corrida distribuida con la referencia secuencial
    Verify {
        #[arg(long, default_value = "wc")]
        workload: String,

        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<String>,
    },
}

fn print_progress(p: &JobProgress) {
    println!("Job:");
    println!("  fase: {:?}", p.phase);
    println!(
        "  map: {}/{}  reduce: {}/{}",
        p.maps_completed, p.maps_total, p.reduces_completed, p.reduces_total
    );
    println!("  progreso: {:.1}%", p.percent());
    println!("  reasignaciones: {}", p.reassignments);
    println!("  iniciado: {}", p.started_at);
    if let Some(ref done) = p.finished_at {
        println!("  finalizado: {}", done);
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let client = Client::new();
            let url = format!("{}/api/v1/job", coordinator_base_url());
            let resp = client.get(&url).send().await?;

            if resp.status().is_success() {
                let progress: JobProgress = resp.json().await?;
                print_progress(&progress);
            } else {
                bail!("el coordinator respondió {}", resp.status());
            }
        }

        Commands::Sequential {
            workload,
            output,
            inputs,
        } => {
            let app = workload::named(&workload)?;
            println!("Ejecutando {} secuencial sobre {} archivos...", workload, inputs.len());

            let keys = engine::run_sequential_to_file(app.as_ref(), &inputs, &output)?;

            println!("Resultado guardado en {}", output.display());
            println!("Procesadas {} claves únicas", keys);
        }

        Commands::Verify {
            workload,
            output_dir,
            inputs,
        } => {
            let app = workload::named(&workload)?;
            let reference = engine::run_sequential(app.as_ref(), &inputs)?;
            let distributed = results::read_outputs(&output_dir)?;
            let cmp = results::compare(&reference, &distributed);

            if cmp.passed() {
                println!("PASS: {} claves coinciden", reference.len());
            } else {
                println!("FAIL:");
                for key in &cmp.missing {
                    println!("  falta       : {}", key);
                }
                for key in &cmp.unexpected {
                    println!("  sobra       : {}", key);
                }
                for (key, want, got) in &cmp.mismatched {
                    println!("  distinto    : {} (esperado {}, obtenido {})", key, want, got);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
