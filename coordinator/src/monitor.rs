use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::state::AppState;

/// Espera a que el job termine, loguea progreso mientras tanto y, ya en Done,
/// deja pasar `shutdown_grace` para que los workers que siguen preguntando
/// reciban JOB_FINISHED. Cuando vuelve, el servidor arranca el cierre.
pub async fn wait_for_completion(state: AppState) {
    let mut done = state.scheduler.subscribe_done();
    let period = state.config.progress_interval.max(Duration::from_millis(100));
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;

    loop {
        tokio::select! {
            res = async { done.wait_for(|finished| *finished).await.map(|_| ()) } => {
                if res.is_err() {
                    // el Scheduler vive en el AppState, no debería pasar
                    info!("canal de fin cerrado, cerrando coordinator");
                    return;
                }
                break;
            }
            _ = ticker.tick() => {
                let p = state.scheduler.progress();
                info!(
                    "progreso: {:?} map {}/{} reduce {}/{} ({:.1}%), reasignaciones={}",
                    p.phase,
                    p.maps_completed,
                    p.maps_total,
                    p.reduces_completed,
                    p.reduces_total,
                    p.percent(),
                    p.reassignments
                );
            }
        }
    }

    let grace: Duration = state.config.shutdown_grace;
    info!("job terminado, cerrando en {:?}", grace);
    sleep(grace).await;
}
