//! Piezas compartidas entre coordinator, workers y el cliente:
//! mensajes RPC, aplicaciones enchufables y el motor de shuffle en disco.

pub mod config;
pub mod engine;
pub mod job;
pub mod results;
pub mod task;
pub mod worker;
pub mod workload;

pub use job::{JobProgress, Phase};
pub use task::{KeyValue, TaskId, TaskKind, WorkAssignment};
pub use worker::{
    AskForWorkRequest, AskForWorkResponse, MarkWorkAsFinishedRequest, MarkWorkAsFinishedResponse,
    Work, WorkOutcome, WorkerId,
};
pub use workload::{SharedWorkload, Workload};
