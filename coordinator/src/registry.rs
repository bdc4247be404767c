//! Registro de tareas del job: única fuente de verdad sobre qué trabajo existe
//! y en qué estado está. No sabe nada de locks ni de red; el [`Scheduler`]
//! lo envuelve en un mutex.
//!
//! [`Scheduler`]: crate::scheduler::Scheduler

use std::time::{Duration, Instant};

use common::{Phase, TaskId, TaskKind, WorkerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Assigned,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    /// Map: ruta del split. Reduce: índice de partición en decimal.
    pub name: String,
    pub status: TaskStatus,
    pub assigned_at: Option<Instant>,
    /// Sólo informativo: cualquier worker que reporte la tarea es confiable.
    pub assignee: Option<WorkerId>,
    pub attempts: u32,
}

impl Task {
    fn new(id: TaskId, kind: TaskKind, name: String) -> Self {
        Self {
            id,
            kind,
            name,
            status: TaskStatus::Pending,
            assigned_at: None,
            assignee: None,
            attempts: 0,
        }
    }

    fn is_stale(&self, now: Instant, liveness_timeout: Duration) -> bool {
        match (self.status, self.assigned_at) {
            (TaskStatus::Assigned, Some(at)) => now.saturating_duration_since(at) >= liveness_timeout,
            _ => false,
        }
    }
}

/// Resultado de `mark_completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Primera vez que se completa: se descontó del pendiente.
    Newly,
    /// Ya estaba completada; no cambia nada.
    AlreadyCompleted,
    /// No hay ninguna tarea con ese nombre y tipo.
    Unknown,
}

#[derive(Debug)]
pub struct TaskRegistry {
    // Vec en orden de id: el recorrido es estable dentro de una ejecución
    map_tasks: Vec<Task>,
    reduce_tasks: Vec<Task>,
    maps_outstanding: usize,
    reduces_outstanding: usize,
    liveness_timeout: Duration,
    reassignments: u32,
}

impl TaskRegistry {
    /// Un Map por split (ids 1..=n) y `reducer_count` Reduce
    /// (id = partición + 1, nombre = partición).
    pub fn new(splits: &[String], reducer_count: u32, liveness_timeout: Duration) -> Self {
        let map_tasks: Vec<Task> = splits
            .iter()
            .enumerate()
            .map(|(i, split)| Task::new(i as TaskId + 1, TaskKind::Map, split.clone()))
            .collect();

        let reduce_tasks: Vec<Task> = (0..reducer_count)
            .map(|p| Task::new(p + 1, TaskKind::Reduce, p.to_string()))
            .collect();

        Self {
            maps_outstanding: map_tasks.len(),
            reduces_outstanding: reduce_tasks.len(),
            map_tasks,
            reduce_tasks,
            liveness_timeout,
            reassignments: 0,
        }
    }

    fn tasks(&self, kind: TaskKind) -> &[Task] {
        match kind {
            TaskKind::Map => &self.map_tasks,
            TaskKind::Reduce => &self.reduce_tasks,
        }
    }

    fn tasks_mut(&mut self, kind: TaskKind) -> &mut [Task] {
        match kind {
            TaskKind::Map => &mut self.map_tasks,
            TaskKind::Reduce => &mut self.reduce_tasks,
        }
    }

    pub fn mapper_count(&self) -> u32 {
        self.map_tasks.len() as u32
    }

    pub fn reducer_count(&self) -> u32 {
        self.reduce_tasks.len() as u32
    }

    pub fn liveness_timeout(&self) -> Duration {
        self.liveness_timeout
    }

    pub fn reassignments(&self) -> u32 {
        self.reassignments
    }

    pub fn outstanding(&self, kind: TaskKind) -> usize {
        match kind {
            TaskKind::Map => self.maps_outstanding,
            TaskKind::Reduce => self.reduces_outstanding,
        }
    }

    pub fn get(&self, kind: TaskKind, id: TaskId) -> Option<&Task> {
        self.tasks(kind).iter().find(|t| t.id == id)
    }

    /// Primera tarea Pending del tipo pedido; si no hay, la primera Assigned
    /// cuya asignación tenga al menos `liveness_timeout` (worker presuntamente
    /// caído). Nunca devuelve un Reduce mientras quede algún Map pendiente.
    pub fn next_available_task(&self, kind: TaskKind, now: Instant) -> Option<TaskId> {
        if kind == TaskKind::Reduce && self.maps_outstanding > 0 {
            return None;
        }

        let tasks = self.tasks(kind);
        tasks
            .iter()
            .find(|t| t.status == TaskStatus::Pending)
            .or_else(|| {
                tasks
                    .iter()
                    .find(|t| t.is_stale(now, self.liveness_timeout))
            })
            .map(|t| t.id)
    }

    /// Pasa la tarea a Assigned y sella `assigned_at = now`.
    /// Devuelve la tarea actualizada, o `None` si no existe o ya está completada.
    pub fn assign(
        &mut self,
        kind: TaskKind,
        id: TaskId,
        worker_id: &str,
        now: Instant,
    ) -> Option<&Task> {
        let timeout = self.liveness_timeout;
        let mut reclaimed = false;

        let task = self.tasks_mut(kind).iter_mut().find(|t| t.id == id)?;
        match task.status {
            TaskStatus::Completed => return None,
            TaskStatus::Assigned => {
                debug_assert!(task.is_stale(now, timeout));
                reclaimed = true;
            }
            TaskStatus::Pending => {}
        }

        task.status = TaskStatus::Assigned;
        task.assigned_at = Some(now);
        task.assignee = Some(worker_id.to_string());
        task.attempts += 1;

        if reclaimed {
            self.reassignments += 1;
        }
        self.get(kind, id)
    }

    /// Marca como completada la tarea `name` de tipo `kind`. Idempotente:
    /// una segunda llamada no vuelve a descontar.
    pub fn mark_completed(&mut self, name: &str, kind: TaskKind) -> Completion {
        let Some(task) = self.tasks_mut(kind).iter_mut().find(|t| t.name == name) else {
            return Completion::Unknown;
        };

        if task.status == TaskStatus::Completed {
            return Completion::AlreadyCompleted;
        }

        task.status = TaskStatus::Completed;
        task.assigned_at = None;

        match kind {
            TaskKind::Map => self.maps_outstanding -= 1,
            TaskKind::Reduce => self.reduces_outstanding -= 1,
        }
        Completion::Newly
    }

    pub fn phase(&self) -> Phase {
        if self.maps_outstanding > 0 {
            Phase::Mapping
        } else if self.reduces_outstanding > 0 {
            Phase::Reducing
        } else {
            Phase::Done
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn registry(maps: usize, reducers: u32) -> TaskRegistry {
        let splits: Vec<String> = (0..maps).map(|i| format!("files/in-{}.txt", i)).collect();
        TaskRegistry::new(&splits, reducers, TIMEOUT)
    }

    fn finish_all(reg: &mut TaskRegistry, kind: TaskKind) {
        let names: Vec<String> = reg.tasks(kind).iter().map(|t| t.name.clone()).collect();
        for name in names {
            reg.mark_completed(&name, kind);
        }
    }

    #[test]
    fn ids_son_secuenciales_por_tipo() {
        let reg = registry(3, 2);

        let map_ids: Vec<TaskId> = reg.map_tasks.iter().map(|t| t.id).collect();
        let reduce: Vec<(TaskId, &str)> = reg
            .reduce_tasks
            .iter()
            .map(|t| (t.id, t.name.as_str()))
            .collect();

        assert_eq!(map_ids, vec![1, 2, 3]);
        assert_eq!(reduce, vec![(1, "0"), (2, "1")]);
        assert_eq!(reg.mapper_count(), 3);
        assert_eq!(reg.reducer_count(), 2);
    }

    #[test]
    fn reduce_no_se_entrega_mientras_quede_algun_map() {
        let mut reg = registry(2, 3);
        let now = Instant::now();

        assert_eq!(reg.next_available_task(TaskKind::Reduce, now), None);

        reg.mark_completed("files/in-0.txt", TaskKind::Map);
        assert_eq!(reg.phase(), Phase::Mapping);
        assert_eq!(reg.next_available_task(TaskKind::Reduce, now), None);

        // ni siquiera mucho después
        let later = now + TIMEOUT * 10;
        assert_eq!(reg.next_available_task(TaskKind::Reduce, later), None);

        reg.mark_completed("files/in-1.txt", TaskKind::Map);
        assert_eq!(reg.phase(), Phase::Reducing);
        assert_eq!(reg.next_available_task(TaskKind::Reduce, now), Some(1));
    }

    #[test]
    fn pending_tiene_prioridad_sobre_reclamar() {
        let mut reg = registry(2, 1);
        let t0 = Instant::now();

        let first = reg.next_available_task(TaskKind::Map, t0).unwrap();
        reg.assign(TaskKind::Map, first, "w1", t0).unwrap();

        let late = t0 + TIMEOUT * 2;
        let next = reg.next_available_task(TaskKind::Map, late).unwrap();
        assert_ne!(next, first);
        assert_eq!(reg.get(TaskKind::Map, next).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn asignacion_se_reclama_justo_al_vencer_el_timeout() {
        let mut reg = registry(1, 1);
        let t0 = Instant::now();
        reg.assign(TaskKind::Map, 1, "w1", t0).unwrap();

        let almost = t0 + TIMEOUT - Duration::from_millis(1);
        assert_eq!(reg.next_available_task(TaskKind::Map, almost), None);

        let exactly = t0 + TIMEOUT;
        assert_eq!(reg.next_available_task(TaskKind::Map, exactly), Some(1));

        let task = reg.assign(TaskKind::Map, 1, "w2", exactly).unwrap();
        assert_eq!(task.assignee.as_deref(), Some("w2"));
        assert_eq!(task.attempts, 2);
        assert_eq!(task.assigned_at, Some(exactly));
        assert_eq!(reg.reassignments(), 1);
    }

    #[test]
    fn mark_completed_es_idempotente() {
        let mut reg = registry(2, 1);

        assert_eq!(
            reg.mark_completed("files/in-0.txt", TaskKind::Map),
            Completion::Newly
        );
        let once = reg.outstanding(TaskKind::Map);

        assert_eq!(
            reg.mark_completed("files/in-0.txt", TaskKind::Map),
            Completion::AlreadyCompleted
        );
        assert_eq!(reg.outstanding(TaskKind::Map), once);
        assert_eq!(once, 1);
    }

    #[test]
    fn mark_completed_con_nombre_desconocido_no_toca_contadores() {
        let mut reg = registry(1, 1);
        assert_eq!(
            reg.mark_completed("files/otro.txt", TaskKind::Map),
            Completion::Unknown
        );
        // el nombre de un Reduce no sirve para un Map
        assert_eq!(reg.mark_completed("0", TaskKind::Map), Completion::Unknown);
        assert_eq!(reg.outstanding(TaskKind::Map), 1);
    }

    #[test]
    fn tarea_completada_nunca_vuelve_a_entregarse() {
        let mut reg = registry(1, 1);
        let t0 = Instant::now();
        reg.assign(TaskKind::Map, 1, "w1", t0).unwrap();
        reg.mark_completed("files/in-0.txt", TaskKind::Map);

        let late = t0 + TIMEOUT * 5;
        assert_eq!(reg.next_available_task(TaskKind::Map, late), None);
        assert!(reg.assign(TaskKind::Map, 1, "w2", late).is_none());
        assert_eq!(reg.get(TaskKind::Map, 1).unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn fases_avanzan_hasta_done() {
        let mut reg = registry(2, 2);
        assert_eq!(reg.phase(), Phase::Mapping);

        finish_all(&mut reg, TaskKind::Map);
        assert_eq!(reg.phase(), Phase::Reducing);

        finish_all(&mut reg, TaskKind::Reduce);
        assert_eq!(reg.phase(), Phase::Done);
    }

    #[test]
    fn sin_splits_arranca_directo_en_reducing() {
        let reg = registry(0, 2);
        assert_eq!(reg.phase(), Phase::Reducing);
        assert_eq!(reg.next_available_task(TaskKind::Reduce, Instant::now()), Some(1));
    }
}
