//! Per-rule listing: the name/tags summary printed or written for each rule.

use atags_parser::TaggedEntity;
use serde::Serialize;

/// One rule's name and tags, serialized with `Name` / `Tags` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Tags")]
    pub tags: &'a [String],
}

impl<'a> RuleSummary<'a> {
    pub fn new(entity: &'a TaggedEntity) -> Self {
        RuleSummary {
            name: &entity.name,
            tags: &entity.tags,
        }
    }

    /// `Name: <name> Tags: <tag> <tag> ...`
    pub fn to_text(&self) -> String {
        format!("Name: {} Tags: {}", self.name, self.tags.join(" "))
    }

    /// A file stem derived from the rule name that is safe to join onto an
    /// output directory.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        match stem.as_str() {
            "" | "." | ".." => "unnamed".to_string(),
            _ => stem,
        }
    }
}
