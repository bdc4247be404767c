use crate::task::KeyValue;
use crate::workload::Workload;

/// Cuenta palabras: cada token separado por espacios emite `(palabra, "1")`.
pub struct WordCount;

pub(crate) fn tokenize(contents: &str) -> Vec<KeyValue> {
    contents
        .split_whitespace()
        .map(|word| KeyValue::new(word, "1"))
        .collect()
}

impl Workload for WordCount {
    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        tokenize(contents)
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_un_uno_por_palabra() {
        let kvs = WordCount.map("x.txt", "the cat\n  the\tdog ");
        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["the", "cat", "the", "dog"]);
        assert!(kvs.iter().all(|kv| kv.value == "1"));
    }

    #[test]
    fn reduce_cuenta_valores() {
        let values = vec!["1".to_string(); 3];
        assert_eq!(WordCount.reduce("the", &values), "3");
    }

    #[test]
    fn map_de_texto_vacio_no_emite_nada() {
        assert!(WordCount.map("x.txt", "   \n").is_empty());
    }
}
