//! Sigma rule decoding.
//!
//! Only `title` and `tags` are read; detection, logsource and every other
//! section of the document are ignored. Decoding is permissive the way a
//! schema-less YAML unmarshal is: a missing title yields an empty name and a
//! missing (or null) `tags` field yields an empty tag list. Only the first
//! document of a multi-document file is read.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use crate::ast::TaggedEntity;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct SigmaRecord {
    #[serde(default, deserialize_with = "scalar_string")]
    title: String,

    #[serde(default, deserialize_with = "scalar_list")]
    tags: Vec<String>,
}

/// Decode the first Sigma rule document of `input`.
///
/// ```rust
/// use atags_parser::parse_sigma_rule;
///
/// let entity = parse_sigma_rule(b"title: R1\ntags: [a, b]\n").unwrap();
/// assert_eq!(entity.name, "R1");
/// assert_eq!(entity.tags, ["a", "b"]);
/// ```
pub fn parse_sigma_rule(input: &[u8]) -> Result<TaggedEntity> {
    let Some(document) = serde_yaml::Deserializer::from_slice(input).next() else {
        return Ok(TaggedEntity::new("", Vec::new()));
    };

    let value = Value::deserialize(document)?;
    if value.is_null() {
        return Ok(TaggedEntity::new("", Vec::new()));
    }
    let record: SigmaRecord = serde_yaml::from_value(value)?;
    Ok(TaggedEntity::new(record.title, record.tags))
}

// =============================================================================
// YAML Helpers
// =============================================================================

/// String form of a YAML scalar. Numbers and booleans are kept as written so
/// numeric tags survive decoding.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string).unwrap_or_default())
}

/// Accepts a sequence of scalars or a lone scalar. Non-scalar entries
/// (nested mappings or sequences) are skipped.
fn scalar_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Sequence(seq)) => seq.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(&other).into_iter().collect(),
        None => Vec::new(),
    })
}
