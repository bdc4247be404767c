use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

/// Lista los `mr-out-*` de un directorio de salida, ordenados por nombre.
pub fn output_files(output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(output_dir)
        .with_context(|| format!("no se pudo leer {}", output_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("error listando {}", output_dir.display()))?;
        let ft = entry
            .file_type()
            .with_context(|| format!("error leyendo el tipo de {}", entry.path().display()))?;
        if !ft.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with("mr-out-") {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Junta todas las líneas `"<key> <result>"` de los `mr-out-*` en un mapa.
/// Una clave repetida entre archivos es un error: cada clave pertenece a
/// una sola partición.
pub fn read_outputs(output_dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut results = BTreeMap::new();

    for path in output_files(output_dir)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("error leyendo {}", path.display()))?;
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once(' ').unwrap_or((line, ""));
            if results.insert(key.to_string(), value.to_string()).is_some() {
                bail!("la clave `{}` aparece más de una vez ({})", key, path.display());
            }
        }
    }

    Ok(results)
}

/// Diferencias entre el resultado de referencia y el distribuido.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
    pub mismatched: Vec<(String, String, String)>,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.mismatched.is_empty()
    }
}

pub fn compare(
    reference: &BTreeMap<String, String>,
    distributed: &BTreeMap<String, String>,
) -> Comparison {
    let mut cmp = Comparison::default();

    for (key, expected) in reference {
        match distributed.get(key) {
            None => cmp.missing.push(key.clone()),
            Some(got) if got != expected => {
                cmp.mismatched
                    .push((key.clone(), expected.clone(), got.clone()))
            }
            Some(_) => {}
        }
    }
    for key in distributed.keys() {
        if !reference.contains_key(key) {
            cmp.unexpected.push(key.clone());
        }
    }

    cmp
}
