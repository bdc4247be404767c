use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{
    AskForWorkRequest, AskForWorkResponse, JobProgress, MarkWorkAsFinishedRequest,
    MarkWorkAsFinishedResponse,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/job", get(job_progress))
        .route("/api/v1/tasks/next", post(ask_for_work))
        .route("/api/v1/tasks/complete", post(mark_work_as_finished))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// AskForWork: Map/Reduce, NO_WORK si todo está en vuelo, JOB_FINISHED al final
async fn ask_for_work(
    State(state): State<AppState>,
    Json(req): Json<AskForWorkRequest>,
) -> Json<AskForWorkResponse> {
    let work = state.scheduler.ask_for_work(&req.worker_id);
    Json(AskForWorkResponse::from(work))
}

// MarkWorkAsFinished: siempre ok, aunque la tarea ya estuviera completada
async fn mark_work_as_finished(
    State(state): State<AppState>,
    Json(req): Json<MarkWorkAsFinishedRequest>,
) -> Json<MarkWorkAsFinishedResponse> {
    state
        .scheduler
        .mark_work_as_finished(&req.worker_id, &req.task_name, req.task_kind);
    Json(MarkWorkAsFinishedResponse { ok: true })
}

async fn job_progress(State(state): State<AppState>) -> Json<JobProgress> {
    Json(state.scheduler.progress())
}
