//! Deep merge of audit documents.
//!
//! Objects merge key by key, recursively. Everything else (scalars, arrays,
//! null) is a leaf and the last writer wins. Folding is order dependent, so
//! callers fold in the order references were listed.

use crate::error::{Result, WorkerError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// A parsed audit document. The top level is always a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditDocument(Map<String, Value>);

impl AuditDocument {
    /// Creates an empty document, the identity of a fold.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parses raw artifact bytes, rejecting anything that is not an object.
    pub fn parse(key: &str, bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|e| WorkerError::parse(key, e))?;
        Self::from_value(key, value)
    }

    /// Wraps an already decoded value.
    pub fn from_value(key: &str, value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(WorkerError::parse(
                key,
                format!("expected a JSON object, found {}", value_kind(&other)),
            )),
        }
    }

    /// Returns the top-level value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up a nested value by JSON pointer, e.g. `/timing/total`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        match path.split_once('/') {
            Some((head, rest)) => self.0.get(head)?.pointer(&format!("/{}", rest)),
            None => self.0.get(path),
        }
    }

    /// Merges `source` into this document, consuming it.
    pub fn merge(&mut self, source: AuditDocument) {
        merge_maps(&mut self.0, source.0);
    }

    /// Serializes the document as pretty-printed JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.0)?)
    }
}

impl From<AuditDocument> for Value {
    fn from(doc: AuditDocument) -> Self {
        Value::Object(doc.0)
    }
}

/// Merges `source` into `target`.
///
/// When both sides are objects their keys are combined recursively;
/// otherwise `target` is replaced by `source`.
pub fn merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(existing), Value::Object(incoming)) => merge_maps(existing, incoming),
        (slot, incoming) => *slot = incoming,
    }
}

fn merge_maps(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

/// Result of folding a list of stored artifacts.
#[derive(Debug, Clone, Default)]
pub struct FoldOutcome {
    /// The merged document.
    pub document: AuditDocument,
    /// Keys of artifacts that contributed.
    pub merged: Vec<String>,
    /// Keys of artifacts that failed to parse and were left out.
    pub skipped: Vec<String>,
}

/// Folds already parsed documents left to right.
pub fn fold_documents<I>(documents: I) -> AuditDocument
where
    I: IntoIterator<Item = AuditDocument>,
{
    documents
        .into_iter()
        .fold(AuditDocument::new(), |mut acc, doc| {
            acc.merge(doc);
            acc
        })
}

/// Parses and folds raw artifacts in the given order.
///
/// An artifact that does not parse is logged and skipped; the fold carries
/// on with the rest.
pub fn fold_artifacts<I>(artifacts: I) -> FoldOutcome
where
    I: IntoIterator<Item = (String, Vec<u8>)>,
{
    let mut documents = Vec::new();
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for (key, bytes) in artifacts {
        match AuditDocument::parse(&key, &bytes) {
            Ok(doc) => {
                debug!("Merging artifact {}", key);
                documents.push(doc);
                merged.push(key);
            }
            Err(e) => {
                warn!("Skipping artifact: {}", e);
                skipped.push(key);
            }
        }
    }

    FoldOutcome {
        document: fold_documents(documents),
        merged,
        skipped,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> AuditDocument {
        AuditDocument::from_value("test", value).unwrap()
    }

    fn fold_values(values: Vec<Value>) -> Value {
        fold_documents(values.into_iter().map(doc)).into()
    }

    #[test]
    fn test_last_writer_wins() {
        let a = json!({"k": 1, "only_a": true});
        let b = json!({"k": 2});

        assert_eq!(
            fold_values(vec![a.clone(), b.clone()]),
            json!({"k": 2, "only_a": true})
        );
        assert_eq!(
            fold_values(vec![b, a]),
            json!({"k": 1, "only_a": true})
        );
    }

    #[test]
    fn test_nested_objects_combine() {
        let merged = fold_values(vec![json!({"a": {"x": 1}}), json!({"a": {"y": 2}})]);
        assert_eq!(merged, json!({"a": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_arrays_are_atomic() {
        let merged = fold_values(vec![json!({"a": [1, 2]}), json!({"a": [3]})]);
        assert_eq!(merged, json!({"a": [3]}));
    }

    #[test]
    fn test_shape_mismatch_does_not_fail() {
        let mut target = json!({"a": 5, "b": {"c": 1}});
        merge(&mut target, json!({"a": {"z": 1}, "b": "flat"}));
        assert_eq!(target, json!({"a": {"z": 1}, "b": "flat"}));

        let mut scalar = json!(3);
        merge(&mut scalar, json!({"k": 1}));
        assert_eq!(scalar, json!({"k": 1}));
    }

    #[test]
    fn test_null_overwrites() {
        let merged = fold_values(vec![json!({"a": {"x": 1}}), json!({"a": null})]);
        assert_eq!(merged, json!({"a": null}));
    }

    #[test]
    fn test_merge_keeps_first_seen_key_order() {
        let merged = fold_values(vec![
            json!({"audits": {"b": {"v": 1}, "a": {"v": 1}}}),
            json!({"audits": {"c": {"v": 2}, "b": {"v": 2}}}),
        ]);
        let keys: Vec<_> = merged["audits"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(merged["audits"]["b"]["v"], 2);
    }

    #[test]
    fn test_merge_does_not_touch_source_document() {
        let source = doc(json!({"a": {"x": 1}}));
        let mut target = AuditDocument::new();
        target.merge(source.clone());
        target.merge(doc(json!({"a": {"x": 9}})));

        assert_eq!(source.get("a"), Some(&json!({"x": 1})));
        assert_eq!(target.get("a"), Some(&json!({"x": 9})));
    }

    #[test]
    fn test_fold_artifacts_skips_malformed() {
        let artifacts = vec![
            ("one.json".to_string(), br#"{"a": 1, "n": {"x": 1}}"#.to_vec()),
            ("broken.json".to_string(), b"{not json".to_vec()),
            ("array.json".to_string(), b"[1, 2, 3]".to_vec()),
            ("two.json".to_string(), br#"{"n": {"y": 2}}"#.to_vec()),
        ];

        let outcome = fold_artifacts(artifacts);

        assert_eq!(outcome.merged, vec!["one.json", "two.json"]);
        assert_eq!(outcome.skipped, vec!["broken.json", "array.json"]);
        assert_eq!(
            Value::from(outcome.document),
            json!({"a": 1, "n": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = AuditDocument::parse("k.json", b"\"text\"").unwrap_err();
        assert!(err.to_string().contains("k.json"));
        assert!(err.to_string().contains("a string"));
    }
}
