use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use common::{engine, SharedWorkload, TaskKind, Work, WorkAssignment, WorkerId};

use crate::config::WorkerConfig;
use crate::rpc::CoordinatorClient;

/// Cuánto trabajo hizo un worker antes de parar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub maps_completed: u32,
    pub reduces_completed: u32,
    /// Intentos abandonados por error local (no se reportan)
    pub aborted: u32,
}

/// Worker sin estado: pide trabajo, lo ejecuta con la aplicación que le
/// inyectaron y reporta. Polling → Executing → Reporting → Polling, hasta
/// JOB_FINISHED o hasta que el coordinator deja de existir.
pub struct Worker {
    id: WorkerId,
    client: CoordinatorClient,
    workload: SharedWorkload,
    config: WorkerConfig,
}

/// `<hostname>-<uuid>`
pub fn new_worker_id() -> WorkerId {
    let host = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let host = if host.is_empty() {
        "worker".to_string()
    } else {
        host
    };
    format!("{}-{}", host, uuid::Uuid::new_v4())
}

impl Worker {
    pub fn new(config: WorkerConfig, workload: SharedWorkload) -> Self {
        Self::with_id(new_worker_id(), config, workload)
    }

    pub fn with_id(id: impl Into<WorkerId>, config: WorkerConfig, workload: SharedWorkload) -> Self {
        Self {
            id: id.into(),
            client: CoordinatorClient::new(config.coordinator_url.clone()),
            workload,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Loop principal del worker.
    pub async fn run(self) -> Result<WorkerSummary> {
        info!(
            "worker {} pidiendo trabajo a {}",
            self.id,
            self.client.base_url()
        );

        let mut summary = WorkerSummary::default();
        let mut connect_failures: u32 = 0;

        loop {
            let work = match self.client.ask_for_work(&self.id).await {
                Ok(work) => {
                    connect_failures = 0;
                    work
                }
                Err(e) if e.is_unreachable() => {
                    connect_failures += 1;
                    if connect_failures >= self.config.max_connect_failures {
                        info!(
                            "coordinator inalcanzable {} veces seguidas, asumo que el job terminó",
                            connect_failures
                        );
                        break;
                    }
                    warn!("{} (intento {}), reintentando", e, connect_failures);
                    sleep(self.config.retry_interval).await;
                    continue;
                }
                Err(e) => {
                    warn!("error pidiendo trabajo: {}, reintentando", e);
                    sleep(self.config.retry_interval).await;
                    continue;
                }
            };

            let assignment = match work {
                Work::JobFinished => {
                    info!("el coordinator avisó que el job terminó");
                    break;
                }
                Work::NoWorkYet => {
                    debug!("no hay trabajo, esperando {:?}", self.config.poll_interval);
                    sleep(self.config.poll_interval).await;
                    continue;
                }
                Work::Assigned(a) => a,
            };

            info!(
                "tengo {} {} ({}), intento {}",
                assignment.kind, assignment.task_id, assignment.payload, assignment.attempt
            );

            if let Err(e) = self.execute(&assignment).await {
                // sin reporte: para el coordinator es como si nos hubiéramos caído
                warn!(
                    "abandono {} {}: {:#}",
                    assignment.kind, assignment.task_id, e
                );
                summary.aborted += 1;
                continue;
            }

            match self
                .client
                .mark_work_as_finished(&self.id, assignment.task_name(), assignment.kind)
                .await
            {
                Ok(_) => {
                    debug!("reporté {} {}", assignment.kind, assignment.task_id);
                    match assignment.kind {
                        TaskKind::Map => summary.maps_completed += 1,
                        TaskKind::Reduce => summary.reduces_completed += 1,
                    }
                }
                Err(e) => {
                    // el próximo pedido se entera si el coordinator se fue
                    warn!(
                        "no pude reportar {} {}: {}",
                        assignment.kind, assignment.task_id, e
                    );
                }
            }
        }

        info!(
            "worker {} terminado: {} map, {} reduce, {} abandonadas",
            self.id, summary.maps_completed, summary.reduces_completed, summary.aborted
        );
        Ok(summary)
    }

    /// Corre la tarea en el pool de bloqueo; los archivos quedan cerrados y
    /// en su lugar antes de volver.
    async fn execute(&self, assignment: &WorkAssignment) -> Result<()> {
        let workload = Arc::clone(&self.workload);
        let work_dir: PathBuf = self.config.work_dir.clone();
        let a = assignment.clone();

        let handle = tokio::task::spawn_blocking(move || -> Result<()> {
            match a.kind {
                TaskKind::Map => {
                    let files = engine::run_map_task(
                        workload.as_ref(),
                        &a.payload,
                        a.task_id,
                        a.reducer_count,
                        &work_dir,
                    )?;
                    debug!("map {} escribió {} particiones", a.task_id, files.len());
                }
                TaskKind::Reduce => {
                    let partition: u32 = a
                        .payload
                        .parse()
                        .with_context(|| format!("partición inválida: {}", a.payload))?;
                    let out = engine::run_reduce_task(
                        workload.as_ref(),
                        partition,
                        a.task_id,
                        a.mapper_count,
                        &work_dir,
                    )?;
                    debug!("reduce {} escribió {}", a.task_id, out.display());
                }
            }
            Ok(())
        });

        handle
            .await
            .map_err(|e| anyhow!("la tarea entró en pánico o se canceló: {e}"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn worker_id_lleva_hostname_y_uuid() {
        let a = new_worker_id();
        let b = new_worker_id();
        assert_ne!(a, b);
        // uuid v4 con guiones: 36 caracteres al final
        assert!(a.len() > 36);
    }

    #[tokio::test]
    async fn sin_coordinator_el_worker_para_solo() {
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let config = WorkerConfig {
            coordinator_url: format!("http://127.0.0.1:{}", port),
            retry_interval: Duration::from_millis(10),
            max_connect_failures: 2,
            ..WorkerConfig::default()
        };
        let workload = common::workload::named("wc").unwrap();

        let summary = Worker::with_id("w-test", config, workload)
            .run()
            .await
            .unwrap();

        assert_eq!(summary, WorkerSummary::default());
    }
}
