use rand::Rng;
use tracing::error;

use crate::task::KeyValue;
use crate::workload::{wc, Workload};

/// Word count que mata el proceso completo con probabilidad `fail_probability`
/// en cada llamada a map o reduce. Sirve para probar la recuperación por
/// timeout desde fuera (el worker simplemente desaparece).
pub struct WordCountWithFails {
    pub fail_probability: f64,
}

impl Default for WordCountWithFails {
    fn default() -> Self {
        Self {
            fail_probability: 0.2,
        }
    }
}

impl WordCountWithFails {
    fn maybe_die(&self) {
        if self.fail_probability > 0.0 && rand::rng().random::<f64>() < self.fail_probability {
            error!("I die x _ x");
            std::process::exit(1);
        }
    }
}

impl Workload for WordCountWithFails {
    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        self.maybe_die();
        wc::tokenize(contents)
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        self.maybe_die();
        values.len().to_string()
    }
}
