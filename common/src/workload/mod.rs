//! Lógica de negocio enchufable (las funciones Map y Reduce del usuario).
//!
//! El núcleo sólo conoce el trait [`Workload`]; cada worker recibe una
//! implementación al construirse, normalmente resuelta por nombre:
//!
//! ```
//! let wc = common::workload::named("wc").unwrap();
//! let kvs = wc.map("a.txt", "the cat the");
//! assert_eq!(kvs.len(), 3);
//! ```

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::task::KeyValue;

pub mod inverted_index;
pub mod wc;
pub mod wc_with_fails;

/// Una aplicación MapReduce.
pub trait Workload: Send + Sync {
    /// Transforma el contenido completo de un split en pares clave/valor.
    /// `filename` es la ruta del split, por si la aplicación la necesita.
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;

    /// Combina todos los valores de una clave en un único resultado.
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

pub type SharedWorkload = Arc<dyn Workload>;

/// Nombres aceptados por [`named`].
pub const WORKLOAD_NAMES: &[&str] = &["wc", "inverted-index", "wc-with-fails"];

/// Busca la aplicación llamada `name`. Devuelve `None` si no existe.
pub fn try_named(name: &str) -> Option<SharedWorkload> {
    match name {
        "wc" => Some(Arc::new(wc::WordCount)),
        "inverted-index" => Some(Arc::new(inverted_index::InvertedIndex)),
        "wc-with-fails" => Some(Arc::new(wc_with_fails::WordCountWithFails::default())),
        _ => None,
    }
}

/// Como [`try_named`], pero con error si no existe.
pub fn named(name: &str) -> Result<SharedWorkload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!(
            "no existe la aplicación `{}` (disponibles: {})",
            name,
            WORKLOAD_NAMES.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todas_las_aplicaciones_listadas_se_resuelven() {
        for name in WORKLOAD_NAMES {
            assert!(try_named(name).is_some(), "falta {}", name);
        }
    }

    #[test]
    fn nombre_desconocido_da_error() {
        let err = named("grep").err().unwrap();
        assert!(err.to_string().contains("grep"));
    }
}
