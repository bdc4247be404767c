use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fase global del job.
/// Mapping mientras quede algún Map sin completar; Reducing cuando todos los
/// Map terminaron pero queda algún Reduce; Done cuando no queda nada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Mapping,
    Reducing,
    Done,
}

/// Foto del progreso del job, la que devuelve `GET /api/v1/job`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProgress {
    pub phase: Phase,
    pub maps_total: u32,
    pub maps_completed: u32,
    pub reduces_total: u32,
    pub reduces_completed: u32,
    /// Asignaciones recuperadas por timeout de liveness
    pub reassignments: u32,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobProgress {
    /// Porcentaje de tareas completadas (Map + Reduce).
    pub fn percent(&self) -> f64 {
        let total = self.maps_total + self.reduces_total;
        if total == 0 {
            return 100.0;
        }
        let done = self.maps_completed + self.reduces_completed;
        (done as f64 / total as f64) * 100.0
    }
}
