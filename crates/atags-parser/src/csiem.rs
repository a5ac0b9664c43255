//! CSIEM JSON rule decoding: `{ "Name": "...", "Tags": ["..."] }`.

use serde::Deserialize;

use crate::ast::TaggedEntity;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct CsiemRecord {
    #[serde(rename = "Name", alias = "name", default)]
    name: Option<String>,

    #[serde(rename = "Tags", alias = "tags", default)]
    tags: Option<Vec<String>>,
}

/// Decode one CSIEM rule. Missing `Name` or `Tags` default to empty.
pub fn parse_csiem_rule(input: &[u8]) -> Result<TaggedEntity> {
    let record: CsiemRecord = serde_json::from_slice(input)?;
    Ok(TaggedEntity::new(
        record.name.unwrap_or_default(),
        record.tags.unwrap_or_default(),
    ))
}
