use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::task::KeyValue;
use crate::workload::Workload;

const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']'];

/// Índice invertido: para cada palabra, en qué documentos aparece.
pub struct InvertedIndex;

impl Workload for InvertedIndex {
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        // sólo el nombre del archivo, no la ruta completa
        let doc = Path::new(filename)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());

        let lowered = contents.to_lowercase();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();

        for raw in lowered.split_whitespace() {
            let word = raw.trim_matches(PUNCTUATION);
            if !word.is_empty() && seen.insert(word) {
                out.push(KeyValue::new(word, doc.clone()));
            }
        }
        out
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        docs.into_iter().collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_cada_palabra_una_vez_por_documento() {
        let kvs = InvertedIndex.map("files/doc1.txt", "Hola, hola mundo! (mundo)");
        assert_eq!(
            kvs,
            vec![
                KeyValue::new("hola", "doc1.txt"),
                KeyValue::new("mundo", "doc1.txt"),
            ]
        );
    }

    #[test]
    fn reduce_deduplica_y_ordena_documentos() {
        let values: Vec<String> = ["b.txt", "a.txt", "b.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(InvertedIndex.reduce("hola", &values), "a.txt,b.txt");
    }
}
