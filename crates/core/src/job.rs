//! Generation job payload.
//!
//! A job is whatever JSON object the caller posted: `prompt`,
//! `negative_prompt`, `seed`, sampler settings, anything. No field is
//! required or validated, and unknown fields ride along untouched, so the
//! relay stays compatible with any WebUI parameter set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single image-generation request payload.
///
/// Transparent wrapper over a JSON object. `serde_json`'s default map keeps
/// keys sorted, which makes [`Job::canonical_json`] stable regardless of the
/// field order the caller used; the content fingerprint in [`crate::dedup`]
/// depends on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job(Map<String, Value>);

impl Job {
    /// Wrap an existing JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parse a job from its serialized JSON form.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The positive prompt, if present and a string.
    pub fn prompt(&self) -> Option<&str> {
        self.0.get("prompt").and_then(Value::as_str)
    }

    /// Replace the positive prompt.
    pub fn set_prompt(&mut self, prompt: String) {
        self.0.insert("prompt".to_string(), Value::String(prompt));
    }

    /// Whether the job carries a non-empty `negative_prompt` string.
    ///
    /// An empty string counts as absent, matching how WebUI clients send
    /// the field when the user left it blank.
    pub fn has_negative_prompt(&self) -> bool {
        self.0
            .get("negative_prompt")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }

    /// Serialize to the canonical compact JSON form (keys in map order).
    pub fn canonical_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: Value) -> Job {
        serde_json::from_value(value).expect("valid job object")
    }

    #[test]
    fn prompt_accessor_reads_string_field() {
        let j = job(json!({ "prompt": "a castle", "seed": 42 }));
        assert_eq!(j.prompt(), Some("a castle"));
    }

    #[test]
    fn prompt_accessor_ignores_non_string() {
        let j = job(json!({ "prompt": 7 }));
        assert_eq!(j.prompt(), None);
    }

    #[test]
    fn set_prompt_replaces_value() {
        let mut j = job(json!({ "prompt": "old" }));
        j.set_prompt("new".to_string());
        assert_eq!(j.prompt(), Some("new"));
    }

    #[test]
    fn empty_negative_prompt_counts_as_absent() {
        assert!(!job(json!({ "prompt": "x" })).has_negative_prompt());
        assert!(!job(json!({ "prompt": "x", "negative_prompt": "" })).has_negative_prompt());
        assert!(job(json!({ "prompt": "x", "negative_prompt": "blurry" })).has_negative_prompt());
    }

    #[test]
    fn canonical_json_is_insertion_order_independent() {
        let mut first = Map::new();
        first.insert("prompt".to_string(), json!("cat"));
        first.insert("seed".to_string(), json!(1));

        let mut second = Map::new();
        second.insert("seed".to_string(), json!(1));
        second.insert("prompt".to_string(), json!("cat"));

        assert_eq!(
            Job::new(first).canonical_json(),
            Job::new(second).canonical_json()
        );
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(Job::parse("[1, 2, 3]").is_err());
        assert!(Job::parse("not json").is_err());
    }
}
