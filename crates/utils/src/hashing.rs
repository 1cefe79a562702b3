use packbridge_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Content hasher for generating options hashes and cache keys
#[derive(Debug)]
pub struct ContentHasher {
    /// Label for debugging purposes
    pub label: String,
    hasher: Sha256,
    /// Descriptions of what was fed into the hasher, in order
    pub inputs: Vec<String>,
}

impl ContentHasher {
    /// Create a new content hasher with a label
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            hasher: Sha256::new(),
            inputs: Vec::new(),
        }
    }

    /// Hash arbitrary content using its canonical JSON form
    pub fn hash_content<T: Serialize + ?Sized>(&mut self, content: &T) -> Result<()> {
        let serialized = canonical_json(content)?;

        self.hasher.update(serialized.as_bytes());
        self.inputs.push(format!("content:{}", serialized.len()));

        Ok(())
    }

    /// Hash a raw string
    pub fn hash_str(&mut self, content: &str) {
        self.hasher.update(content.as_bytes());
        self.inputs.push(format!("str:{}", content.len()));
    }

    /// Finish hashing and return the lowercase hex digest
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Serialize `content` to JSON with every object's keys sorted.
///
/// Two values that differ only in map insertion order produce byte-identical
/// output.
pub fn canonical_json<T: Serialize + ?Sized>(content: &T) -> Result<String> {
    let value = serde_json::to_value(content)
        .map_err(|e| Error::json("failed to serialize content for hashing", e))?;
    serde_json::to_string(&sort_keys(value))
        .map_err(|e| Error::json("failed to serialize content for hashing", e))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
