//! Worker MapReduce: pide tareas al coordinator, las ejecuta con una
//! aplicación enchufable y reporta cuando sus archivos ya están en disco.

pub mod config;
pub mod rpc;
pub mod worker;

pub use config::WorkerConfig;
pub use rpc::{CoordinatorClient, RpcError};
pub use worker::{new_worker_id, Worker, WorkerSummary};
