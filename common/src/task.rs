use serde::{Deserialize, Serialize};

pub type TaskId = u32;

/// Tipo de tarea que maneja el coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    Map,
    Reduce,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Map => f.write_str("map"),
            TaskKind::Reduce => f.write_str("reduce"),
        }
    }
}

/// Un par clave/valor emitido por la función Map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Trabajo concreto que el coordinator le entrega a un worker.
///
/// - `payload`: ruta del split (Map) o índice de partición (Reduce).
/// - `reducer_count`: cuántas particiones tiene que crear un Map.
/// - `mapper_count`: cuántos archivos intermedios tiene que leer un Reduce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAssignment {
    pub kind: TaskKind,
    pub task_id: TaskId,
    pub payload: String,
    pub reducer_count: u32,
    pub mapper_count: u32,
    /// 1 en la primera entrega, +1 por cada reasignación por timeout
    pub attempt: u32,
}

impl WorkAssignment {
    /// Nombre con el que el worker reporta la tarea como terminada.
    pub fn task_name(&self) -> &str {
        &self.payload
    }
}
