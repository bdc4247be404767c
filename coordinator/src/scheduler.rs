use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use common::{JobProgress, Phase, TaskKind, Work, WorkAssignment};

use crate::job::JobSpec;
use crate::registry::{Completion, TaskRegistry};

/// Dueño exclusivo del [`TaskRegistry`]. Toda lectura o mutación pasa por un
/// único mutex, así "decidir qué tarea" y "marcarla asignada" son una sola
/// sección crítica y dos workers no pueden recibir la misma tarea Pending.
pub struct Scheduler {
    registry: Mutex<TaskRegistry>,
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    done_tx: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(job: &JobSpec, liveness_timeout: Duration) -> Self {
        let registry = TaskRegistry::new(&job.splits, job.reducer_count, liveness_timeout);
        let (done_tx, _) = watch::channel(registry.phase() == Phase::Done);

        Self {
            registry: Mutex::new(registry),
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            done_tx,
        }
    }

    // Ninguna operación deja el registro a medias, así que un lock envenenado
    // se puede seguir usando.
    fn lock(&self) -> MutexGuard<'_, TaskRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receptor que pasa a `true` cuando el job llega a Done.
    pub fn subscribe_done(&self) -> watch::Receiver<bool> {
        self.done_tx.subscribe()
    }

    pub fn ask_for_work(&self, worker_id: &str) -> Work {
        self.ask_for_work_at(worker_id, Instant::now())
    }

    /// AskForWork con el reloj explícito (para tests de reclamación).
    pub fn ask_for_work_at(&self, worker_id: &str, now: Instant) -> Work {
        let mut registry = self.lock();

        let kind = match registry.phase() {
            Phase::Done => return Work::JobFinished,
            Phase::Mapping => TaskKind::Map,
            Phase::Reducing => TaskKind::Reduce,
        };

        let Some(id) = registry.next_available_task(kind, now) else {
            debug!("worker {} pidió trabajo pero no hay nada asignable", worker_id);
            return Work::NoWorkYet;
        };

        let mapper_count = registry.mapper_count();
        let reducer_count = registry.reducer_count();
        let timeout = registry.liveness_timeout();

        let Some(task) = registry.assign(kind, id, worker_id, now) else {
            return Work::NoWorkYet;
        };

        if task.attempts > 1 {
            warn!(
                "reasignando {} {} ({}) al worker {}: sin reporte tras {:?} (intento {})",
                kind, task.id, task.name, worker_id, timeout, task.attempts
            );
        } else {
            info!(
                "asignando {} {} ({}) al worker {}",
                kind, task.id, task.name, worker_id
            );
        }

        Work::Assigned(WorkAssignment {
            kind,
            task_id: task.id,
            payload: task.name.clone(),
            reducer_count,
            mapper_count,
            attempt: task.attempts,
        })
    }

    /// MarkWorkAsFinished. Idempotente; si con esto el job queda Done,
    /// avisa a quien esté esperando el cierre.
    pub fn mark_work_as_finished(
        &self,
        worker_id: &str,
        task_name: &str,
        kind: TaskKind,
    ) -> Completion {
        let mut registry = self.lock();

        let completion = registry.mark_completed(task_name, kind);
        match completion {
            Completion::Newly => info!(
                "worker {} terminó {} {} (faltan {} map / {} reduce)",
                worker_id,
                kind,
                task_name,
                registry.outstanding(TaskKind::Map),
                registry.outstanding(TaskKind::Reduce)
            ),
            Completion::AlreadyCompleted => debug!(
                "worker {} reportó {} {} que ya estaba completada",
                worker_id, kind, task_name
            ),
            Completion::Unknown => warn!(
                "worker {} reportó una tarea {} desconocida: {}",
                worker_id, kind, task_name
            ),
        }

        if completion == Completion::Newly && registry.phase() == Phase::Done {
            *self.finished_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
            info!("todas las tareas completadas, el job terminó");
            self.done_tx.send_replace(true);
        }

        completion
    }

    pub fn progress(&self) -> JobProgress {
        let registry = self.lock();
        let maps_total = registry.mapper_count();
        let reduces_total = registry.reducer_count();

        JobProgress {
            phase: registry.phase(),
            maps_total,
            maps_completed: maps_total - registry.outstanding(TaskKind::Map) as u32,
            reduces_total,
            reduces_completed: reduces_total - registry.outstanding(TaskKind::Reduce) as u32,
            reassignments: registry.reassignments(),
            started_at: self.started_at,
            finished_at: *self.finished_at.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn scheduler(maps: usize, reducers: u32) -> Scheduler {
        let job = JobSpec::new(
            (0..maps).map(|i| format!("files/in-{}.txt", i)).collect(),
            reducers,
        )
        .unwrap();
        Scheduler::new(&job, TIMEOUT)
    }

    fn expect_assignment(work: Work) -> WorkAssignment {
        match work {
            Work::Assigned(a) => a,
            other => panic!("esperaba una asignación, llegó {:?}", other),
        }
    }

    #[test]
    fn primero_maps_despues_reduces() {
        let s = scheduler(2, 2);

        let a = expect_assignment(s.ask_for_work("w1"));
        let b = expect_assignment(s.ask_for_work("w2"));
        assert_eq!((a.kind, b.kind), (TaskKind::Map, TaskKind::Map));
        assert_eq!(a.reducer_count, 2);
        assert_eq!(a.mapper_count, 2);
        assert_eq!(a.attempt, 1);

        // los dos maps están en vuelo: no hay reduce para nadie
        assert_eq!(s.ask_for_work("w3"), Work::NoWorkYet);

        s.mark_work_as_finished("w1", &a.payload, TaskKind::Map);
        assert_eq!(s.ask_for_work("w3"), Work::NoWorkYet);

        s.mark_work_as_finished("w2", &b.payload, TaskKind::Map);
        let r = expect_assignment(s.ask_for_work("w3"));
        assert_eq!(r.kind, TaskKind::Reduce);
        assert_eq!(r.payload, "0");
        assert_eq!(r.task_id, 1);
    }

    #[test]
    fn tarea_abandonada_se_reasigna_despues_del_timeout() {
        let s = scheduler(1, 1);
        let t0 = Instant::now();

        let a = expect_assignment(s.ask_for_work_at("w1", t0));
        assert_eq!(
            s.ask_for_work_at("w2", t0 + TIMEOUT - Duration::from_millis(1)),
            Work::NoWorkYet
        );

        let b = expect_assignment(s.ask_for_work_at("w2", t0 + TIMEOUT));
        assert_eq!(b.task_id, a.task_id);
        assert_eq!(b.attempt, 2);
        assert_eq!(s.progress().reassignments, 1);
    }

    #[test]
    fn job_finished_y_aviso_de_cierre_al_completar_todo() {
        let s = scheduler(1, 1);
        let done = s.subscribe_done();
        assert!(!*done.borrow());

        let m = expect_assignment(s.ask_for_work("w1"));
        s.mark_work_as_finished("w1", &m.payload, TaskKind::Map);
        let r = expect_assignment(s.ask_for_work("w1"));
        s.mark_work_as_finished("w1", &r.payload, TaskKind::Reduce);

        assert!(*done.borrow());
        assert_eq!(s.ask_for_work("w2"), Work::JobFinished);

        let p = s.progress();
        assert_eq!(p.phase, Phase::Done);
        assert!(p.finished_at.is_some());
    }

    #[test]
    fn reporte_duplicado_no_cambia_el_progreso() {
        let s = scheduler(2, 1);
        let a = expect_assignment(s.ask_for_work("w1"));

        s.mark_work_as_finished("w1", &a.payload, TaskKind::Map);
        let once = s.progress();
        let second = s.mark_work_as_finished("w9", &a.payload, TaskKind::Map);
        let twice = s.progress();

        assert_eq!(second, Completion::AlreadyCompleted);
        assert_eq!(once.maps_completed, twice.maps_completed);
        assert_eq!(twice.maps_completed, 1);
        assert_eq!(twice.phase, Phase::Mapping);
    }

    #[test]
    fn pedidos_concurrentes_nunca_reciben_la_misma_tarea() {
        let maps = 64;
        let s = Arc::new(scheduler(maps, 4));

        let handles: Vec<_> = (0..maps)
            .map(|i| {
                let s = Arc::clone(&s);
                thread::spawn(move || s.ask_for_work(&format!("w{}", i)))
            })
            .collect();

        let mut ids = HashSet::new();
        for h in handles {
            let a = expect_assignment(h.join().unwrap());
            assert_eq!(a.kind, TaskKind::Map);
            assert!(ids.insert(a.task_id), "tarea {} entregada dos veces", a.task_id);
        }
        assert_eq!(ids.len(), maps);
        assert_eq!(s.ask_for_work("otro"), Work::NoWorkYet);
    }
}
