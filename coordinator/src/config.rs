use std::{path::PathBuf, time::Duration};

use common::config::{env_duration_ms, env_string};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub addr: String,
    /// Tras este tiempo sin reporte, una tarea Assigned se puede reasignar.
    pub liveness_timeout: Duration,
    /// Cuánto se sigue respondiendo JOB_FINISHED antes de cerrar el listener.
    pub shutdown_grace: Duration,
    pub progress_interval: Duration,
    /// Donde se crean `intermediate/` y `output/`.
    pub work_dir: PathBuf,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            work_dir: PathBuf::from("."),
        }
    }
}

impl CoordinatorConfig {
    /// Defaults pisados por `COORDINATOR_ADDR`, `LIVENESS_TIMEOUT_MS`,
    /// `SHUTDOWN_GRACE_MS`, `PROGRESS_INTERVAL_MS` y `WORK_DIR`.
    pub fn from_env() -> Self {
        Self {
            addr: env_string("COORDINATOR_ADDR", DEFAULT_ADDR),
            liveness_timeout: env_duration_ms("LIVENESS_TIMEOUT_MS", DEFAULT_LIVENESS_TIMEOUT),
            shutdown_grace: env_duration_ms("SHUTDOWN_GRACE_MS", DEFAULT_SHUTDOWN_GRACE),
            progress_interval: env_duration_ms("PROGRESS_INTERVAL_MS", DEFAULT_PROGRESS_INTERVAL),
            work_dir: PathBuf::from(env_string("WORK_DIR", ".")),
        }
    }
}
