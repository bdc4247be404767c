//! Coordinator de un job MapReduce: registro de tareas, scheduler con
//! barrera Map→Reduce y reclamación por timeout, y el servicio HTTP que
//! consumen los workers.

pub mod config;
pub mod handlers;
pub mod job;
pub mod monitor;
pub mod registry;
pub mod scheduler;
pub mod state;

use std::fs;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use common::engine::{INTERMEDIATE_DIR, OUTPUT_DIR};
use common::JobProgress;

pub use config::CoordinatorConfig;
pub use job::{JobError, JobSpec};
pub use scheduler::Scheduler;
pub use state::AppState;

/// Sirve el job en `listener` hasta que todas las tareas estén completadas
/// y pase el período de gracia. Devuelve el progreso final.
pub async fn serve(
    listener: TcpListener,
    job: JobSpec,
    config: CoordinatorConfig,
) -> Result<JobProgress> {
    for dir in [INTERMEDIATE_DIR, OUTPUT_DIR] {
        let path = config.work_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("no se pudo crear {}", path.display()))?;
    }

    info!(
        "job con {} splits y {} reducers (liveness timeout {:?})",
        job.mapper_count(),
        job.reducer_count,
        config.liveness_timeout
    );

    let scheduler = Scheduler::new(&job, config.liveness_timeout);
    let state = AppState::new(scheduler, config);
    let app = handlers::build_router(state.clone());

    info!("coordinator escuchando en {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(monitor::wait_for_completion(state.clone()))
        .await
        .context("error sirviendo RPCs")?;

    let progress = state.scheduler.progress();
    info!(
        "coordinator cerrado: {} map y {} reduce completados",
        progress.maps_completed, progress.reduces_completed
    );
    Ok(progress)
}
