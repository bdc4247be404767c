// coordinator/src/state.rs

use std::sync::Arc;

use crate::config::CoordinatorConfig;
use crate::scheduler::Scheduler;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub config: Arc<CoordinatorConfig>,
}

impl AppState {
    pub fn new(scheduler: Scheduler, config: CoordinatorConfig) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            config: Arc::new(config),
        }
    }
}
