// A single Quotebank quotation.
//
// Records are kept as ordered JSON objects rather than a fixed struct so
// that fields the pipeline never looks at (quoteID, probas, urls, ...)
// survive a read/write cycle untouched and in their original order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker value Quotebank uses when no speaker could be attributed.
pub const UNRESOLVED_SPEAKER: &str = "None";

/// One quotation line from a Quotebank file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quotation(Map<String, Value>);

impl Quotation {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The most probable speaker's display name, if the field is a string.
    pub fn speaker(&self) -> Option<&str> {
        self.0.get("speaker").and_then(Value::as_str)
    }

    /// True when Quotebank could not attribute the quotation to anyone.
    pub fn is_speaker_unresolved(&self) -> bool {
        self.speaker() == Some(UNRESOLVED_SPEAKER)
    }

    /// Candidate Wikidata identifiers for the speaker.
    ///
    /// Non-string entries are ignored; a missing `qids` field reads as empty.
    pub fn qids(&self) -> Vec<&str> {
        self.0
            .get("qids")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_qids(&self) -> bool {
        !self.qids().is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field, returning the previous value if there was one.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Field values as strings, for attribute fields added by enrichment.
    pub fn string_list(&self, field: &str) -> Option<Vec<&str>> {
        self.0
            .get(field)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Quotation {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quote(value: Value) -> Quotation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unresolved_speaker_is_the_none_string() {
        assert!(quote(json!({"speaker": "None", "qids": []})).is_speaker_unresolved());
        assert!(!quote(json!({"speaker": "Ada Lovelace", "qids": ["Q7259"]})).is_speaker_unresolved());
        // JSON null is not the sentinel
        assert!(!quote(json!({"speaker": null})).is_speaker_unresolved());
    }

    #[test]
    fn qids_skip_non_strings_and_default_to_empty() {
        let q = quote(json!({"qids": ["Q42", 7, "Q5"]}));
        assert_eq!(q.qids(), vec!["Q42", "Q5"]);
        assert!(quote(json!({"speaker": "x"})).qids().is_empty());
    }

    #[test]
    fn field_order_survives_serialization() {
        let line = r#"{"quoteID":"2019-01-01-000001","quotation":"hi","speaker":"A","qids":["Q1"],"numOccurrences":1}"#;
        let q: Quotation = serde_json::from_str(line).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), line);
    }
}
