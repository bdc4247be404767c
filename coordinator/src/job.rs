use std::collections::HashSet;

use glob::glob;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("la cantidad de reducers tiene que ser al menos 1")]
    NoReducers,

    #[error("patrón de entrada inválido `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Parámetros del job: la lista de splits y la cantidad de reducers,
/// fija desde el arranque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub splits: Vec<String>,
    pub reducer_count: u32,
}

impl JobSpec {
    /// Los splits repetidos se colapsan: el nombre identifica a la tarea.
    pub fn new(splits: Vec<String>, reducer_count: u32) -> Result<Self, JobError> {
        if reducer_count == 0 {
            return Err(JobError::NoReducers);
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(splits.len());
        for split in splits {
            if seen.insert(split.clone()) {
                unique.push(split);
            } else {
                warn!("split repetido ignorado: {}", split);
            }
        }

        Ok(Self {
            splits: unique,
            reducer_count,
        })
    }

    /// Expande cada patrón (glob) a los archivos que hagan match, en orden.
    /// Un patrón que no matchea nada se descarta con un warning.
    pub fn from_patterns(patterns: &[String], reducer_count: u32) -> Result<Self, JobError> {
        let mut splits = Vec::new();

        for pattern in patterns {
            let entries = glob(pattern).map_err(|source| JobError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;

            let before = splits.len();
            for entry in entries.flatten() {
                if entry.is_file() {
                    splits.push(entry.to_string_lossy().to_string());
                }
            }

            if splits.len() == before {
                warn!("el patrón {} no matcheó ningún archivo", pattern);
            }
        }

        Self::new(splits, reducer_count)
    }

    pub fn mapper_count(&self) -> u32 {
        self.splits.len() as u32
    }
}
