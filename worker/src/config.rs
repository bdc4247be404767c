use std::{path::PathBuf, time::Duration};

use common::config::{env_duration_ms, env_or, env_string};

pub const DEFAULT_COORDINATOR_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_CONNECT_FAILURES: u32 = 3;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    /// Espera entre pedidos cuando el coordinator responde NO_WORK.
    pub poll_interval: Duration,
    /// Espera tras un error de RPC antes de volver a pedir.
    pub retry_interval: Duration,
    /// Fallos de conexión seguidos tras los cuales se asume que el
    /// coordinator ya no existe.
    pub max_connect_failures: u32,
    pub work_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            coordinator_url: DEFAULT_COORDINATOR_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_connect_failures: DEFAULT_MAX_CONNECT_FAILURES,
            work_dir: PathBuf::from("."),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self {
            coordinator_url: env_string("COORDINATOR_URL", DEFAULT_COORDINATOR_URL),
            poll_interval: env_duration_ms("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL),
            retry_interval: env_duration_ms("RETRY_INTERVAL_MS", DEFAULT_RETRY_INTERVAL),
            max_connect_failures: env_or("MAX_CONNECT_FAILURES", DEFAULT_MAX_CONNECT_FAILURES)
                .max(1),
            work_dir: PathBuf::from(env_string("WORK_DIR", ".")),
        }
    }
}
