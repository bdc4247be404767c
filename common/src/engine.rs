use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::task::{KeyValue, TaskId};
use crate::workload::Workload;

pub const INTERMEDIATE_DIR: &str = "intermediate";
pub const OUTPUT_DIR: &str = "output";

/* =========================
   Nombres de archivos
   ========================= */

/// `mr-<mapId>-<partition+1>`: las particiones se numeran desde 1 en disco.
pub fn intermediate_file_name(mapper_id: TaskId, partition: u32) -> String {
    format!("mr-{}-{}", mapper_id, partition + 1)
}

pub fn intermediate_path(work_dir: &Path, mapper_id: TaskId, partition: u32) -> PathBuf {
    work_dir
        .join(INTERMEDIATE_DIR)
        .join(intermediate_file_name(mapper_id, partition))
}

pub fn output_file_name(reduce_task_id: TaskId) -> String {
    format!("mr-out-{}", reduce_task_id)
}

pub fn output_path(work_dir: &Path, reduce_task_id: TaskId) -> PathBuf {
    work_dir
        .join(OUTPUT_DIR)
        .join(output_file_name(reduce_task_id))
}

/* =========================
   Hash / partición
   ========================= */

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// FNV-1a de 32 bits enmascarado a no negativo.
/// Tiene que dar lo mismo en cualquier proceso, así que nada de `DefaultHasher`.
pub fn ihash(key: &str) -> u32 {
    let mut h = FNV32_OFFSET_BASIS;
    for b in key.as_bytes() {
        h ^= u32::from(*b);
        h = h.wrapping_mul(FNV32_PRIME);
    }
    h & 0x7fff_ffff
}

/// Partición (0-based) que le toca a `key` con `reducer_count` reducers.
pub fn partition_for(key: &str, reducer_count: u32) -> u32 {
    ihash(key) % reducer_count.max(1)
}

/* =========================
   Escritura atómica
   ========================= */

/// Escribe en un temporal dentro del mismo directorio y lo renombra al final,
/// así nadie ve nunca un archivo a medio escribir.
fn write_atomically<F>(dest: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        fill(&mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

/* =========================
   Shuffle (lado Map)
   ========================= */

/// Reparte los registros de un Map en `reducer_count` archivos intermedios:
///   - uno por partición, aunque quede vacío
///   - cada registro va a `partition_for(key)`
///   - formato JSONL `{"key": .., "value": ..}`
/// Devuelve las rutas creadas, en orden de partición.
pub fn shuffle_to_intermediate(
    records: &[KeyValue],
    mapper_id: TaskId,
    reducer_count: u32,
    work_dir: &Path,
) -> io::Result<Vec<PathBuf>> {
    let reducer_count = reducer_count.max(1);

    let mut buckets: Vec<Vec<&KeyValue>> = vec![Vec::new(); reducer_count as usize];
    for kv in records {
        buckets[partition_for(&kv.key, reducer_count) as usize].push(kv);
    }

    let mut paths = Vec::with_capacity(buckets.len());
    for (pid, bucket) in buckets.into_iter().enumerate() {
        let path = intermediate_path(work_dir, mapper_id, pid as u32);
        write_atomically(&path, |w| {
            for kv in bucket {
                serde_json::to_writer(&mut *w, kv)?;
                w.write_all(b"\n")?;
            }
            Ok(())
        })?;
        paths.push(path);
    }

    Ok(paths)
}

/// Lee un archivo intermedio (JSONL).
pub fn read_intermediate(path: &Path) -> io::Result<Vec<KeyValue>> {
    let reader = BufReader::new(File::open(path)?);

    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("registro inválido en {}: {e}", path.display()),
            )
        })?;
        out.push(kv);
    }

    Ok(out)
}

/* =========================
   Agrupado y Reduce
   ========================= */

/// Agrupa valores por clave. `BTreeMap` para que la salida quede ordenada.
pub fn group_by_key<I>(records: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = KeyValue>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for kv in records {
        groups.entry(kv.key).or_default().push(kv.value);
    }
    groups
}

/// Aplica reduce una vez por clave y escribe `"<key> <result>\n"` en `dest`.
/// Devuelve cuántas claves se escribieron.
pub fn reduce_groups_to_file(
    workload: &dyn Workload,
    groups: &BTreeMap<String, Vec<String>>,
    dest: &Path,
) -> io::Result<usize> {
    write_atomically(dest, |w| {
        for (key, values) in groups {
            let result = workload.reduce(key, values);
            writeln!(w, "{} {}", key, result)?;
        }
        Ok(())
    })?;
    Ok(groups.len())
}

/* =========================
   Tareas completas
   ========================= */

/// Ejecuta una tarea Map completa: lee el split, llama a map y hace el shuffle.
pub fn run_map_task(
    workload: &dyn Workload,
    input_path: &str,
    mapper_id: TaskId,
    reducer_count: u32,
    work_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(input_path)
        .with_context(|| format!("error leyendo split {}", input_path))?;

    let records = workload.map(input_path, &contents);

    shuffle_to_intermediate(&records, mapper_id, reducer_count, work_dir).with_context(|| {
        format!(
            "error escribiendo archivos intermedios del map {}",
            mapper_id
        )
    })
}

/// Ejecuta una tarea Reduce completa: junta `mr-<m>-<partition+1>` de todos
/// los mappers, agrupa por clave y escribe `output/mr-out-<reduce_task_id>`.
pub fn run_reduce_task(
    workload: &dyn Workload,
    partition: u32,
    reduce_task_id: TaskId,
    mapper_count: u32,
    work_dir: &Path,
) -> Result<PathBuf> {
    let mut records = Vec::new();
    for mapper_id in 1..=mapper_count {
        let path = intermediate_path(work_dir, mapper_id, partition);
        let mut part = read_intermediate(&path)
            .with_context(|| format!("error leyendo intermedio {}", path.display()))?;
        records.append(&mut part);
    }

    let groups = group_by_key(records);
    let dest = output_path(work_dir, reduce_task_id);
    reduce_groups_to_file(workload, &groups, &dest)
        .with_context(|| format!("error escribiendo salida {}", dest.display()))?;

    Ok(dest)
}

/* =========================
   Referencia secuencial
   ========================= */

/// Map + agrupado + reduce en un solo proceso, sin shuffle. Es la referencia
/// contra la que se compara la salida distribuida.
pub fn run_sequential(
    workload: &dyn Workload,
    inputs: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut intermediate = Vec::new();
    for input in inputs {
        let contents =
            fs::read_to_string(input).with_context(|| format!("error leyendo {}", input))?;
        intermediate.extend(workload.map(input, &contents));
    }

    Ok(group_by_key(intermediate)
        .into_iter()
        .map(|(key, values)| {
            let result = workload.reduce(&key, &values);
            (key, result)
        })
        .collect())
}

/// Igual que [`run_sequential`] pero deja el resultado en `dest` con el
/// mismo formato que un `mr-out-*`.
pub fn run_sequential_to_file(
    workload: &dyn Workload,
    inputs: &[String],
    dest: &Path,
) -> Result<usize> {
    let results = run_sequential(workload, inputs)?;
    write_atomically(dest, |w| {
        for (key, result) in &results {
            writeln!(w, "{} {}", key, result)?;
        }
        Ok(())
    })
    .with_context(|| format!("error escribiendo {}", dest.display()))?;
    Ok(results.len())
}
