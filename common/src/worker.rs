use serde::{Deserialize, Serialize};

use crate::task::{TaskId, TaskKind, WorkAssignment};

pub type WorkerId = String;

/* --------- AskForWork --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskForWorkRequest {
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOutcome {
    Map,
    Reduce,
    NoWork,
    JobFinished,
}

/// Respuesta plana de AskForWork. Los campos de tarea sólo tienen sentido
/// cuando `outcome` es `MAP` o `REDUCE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskForWorkResponse {
    pub outcome: WorkOutcome,
    #[serde(default)]
    pub task_id: TaskId,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub reducer_count: u32,
    #[serde(default)]
    pub mapper_count: u32,
    #[serde(default)]
    pub attempt: u32,
}

/// Lo que un worker puede recibir al pedir trabajo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Work {
    Assigned(WorkAssignment),
    NoWorkYet,
    JobFinished,
}

impl AskForWorkResponse {
    fn empty(outcome: WorkOutcome) -> Self {
        Self {
            outcome,
            task_id: 0,
            payload: String::new(),
            reducer_count: 0,
            mapper_count: 0,
            attempt: 0,
        }
    }

    pub fn into_work(self) -> Work {
        let kind = match self.outcome {
            WorkOutcome::NoWork => return Work::NoWorkYet,
            WorkOutcome::JobFinished => return Work::JobFinished,
            WorkOutcome::Map => TaskKind::Map,
            WorkOutcome::Reduce => TaskKind::Reduce,
        };
        Work::Assigned(WorkAssignment {
            kind,
            task_id: self.task_id,
            payload: self.payload,
            reducer_count: self.reducer_count,
            mapper_count: self.mapper_count,
            attempt: self.attempt,
        })
    }
}

impl From<Work> for AskForWorkResponse {
    fn from(work: Work) -> Self {
        match work {
            Work::NoWorkYet => Self::empty(WorkOutcome::NoWork),
            Work::JobFinished => Self::empty(WorkOutcome::JobFinished),
            Work::Assigned(a) => Self {
                outcome: match a.kind {
                    TaskKind::Map => WorkOutcome::Map,
                    TaskKind::Reduce => WorkOutcome::Reduce,
                },
                task_id: a.task_id,
                payload: a.payload,
                reducer_count: a.reducer_count,
                mapper_count: a.mapper_count,
                attempt: a.attempt,
            },
        }
    }
}

/* --------- MarkWorkAsFinished --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkWorkAsFinishedRequest {
    pub worker_id: WorkerId,
    pub task_name: String,
    pub task_kind: TaskKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkWorkAsFinishedResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn respuesta_map_se_convierte_en_asignacion() {
        let raw = json!({
            "outcome": "MAP",
            "task_id": 2,
            "payload": "files/a.txt",
            "reducer_count": 3,
            "mapper_count": 4,
            "attempt": 1
        });
        let resp: AskForWorkResponse = serde_json::from_value(raw).unwrap();

        match resp.into_work() {
            Work::Assigned(a) => {
                assert_eq!(a.kind, TaskKind::Map);
                assert_eq!(a.task_id, 2);
                assert_eq!(a.task_name(), "files/a.txt");
                assert_eq!(a.reducer_count, 3);
                assert_eq!(a.mapper_count, 4);
            }
            other => panic!("esperaba asignación, llegó {:?}", other),
        }
    }

    #[test]
    fn job_finished_no_necesita_campos_de_tarea() {
        let resp: AskForWorkResponse =
            serde_json::from_value(json!({ "outcome": "JOB_FINISHED" })).unwrap();
        assert_eq!(resp.into_work(), Work::JobFinished);
    }

    #[test]
    fn no_work_se_serializa_en_screaming_snake_case() {
        let resp = AskForWorkResponse::from(Work::NoWorkYet);
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["outcome"], json!("NO_WORK"));
    }

    #[test]
    fn task_kind_viaja_como_map_reduce() {
        let req = MarkWorkAsFinishedRequest {
            worker_id: "w1".to_string(),
            task_name: "0".to_string(),
            task_kind: TaskKind::Reduce,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["task_kind"], json!("REDUCE"));
    }
}
