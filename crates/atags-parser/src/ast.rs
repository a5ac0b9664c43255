//! Data model shared by every rule format: tagged entities and the corpus
//! they are collected into.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

// =============================================================================
// Source formats
// =============================================================================

/// Rule format an input is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Sigma YAML rule, one record per input.
    Sigma,
    /// YARA rule set, any number of rules per input.
    Yara,
    /// CSIEM JSON rule, one record per input.
    Csiem,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Sigma, SourceFormat::Yara, SourceFormat::Csiem];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sigma" => Some(SourceFormat::Sigma),
            "yara" => Some(SourceFormat::Yara),
            "csiem" => Some(SourceFormat::Csiem),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Sigma => "sigma",
            SourceFormat::Yara => "yara",
            SourceFormat::Csiem => "csiem",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tagged entities
// =============================================================================

/// One decoded rule: its name and the tags attached to it.
///
/// Tags keep their source order and may contain duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedEntity {
    pub name: String,
    pub tags: Vec<String>,
}

impl TaggedEntity {
    pub fn new(name: impl Into<String>, tags: Vec<String>) -> Self {
        TaggedEntity {
            name: name.into(),
            tags,
        }
    }
}

// =============================================================================
// Corpus
// =============================================================================

/// Mapping from entity name to its tag list.
///
/// Iteration follows first-seen insertion order of names. Inserting a name
/// that already exists replaces its tags in place (last write wins) without
/// moving the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCorpus {
    entries: Vec<TaggedEntity>,
    index: HashMap<String, usize>,
}

impl TagCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from `(name, tags)` pairs.
    ///
    /// ```rust
    /// use atags_parser::TagCorpus;
    ///
    /// let corpus = TagCorpus::from_pairs([("Rule1", vec!["tag1", "tag3"]), ("Rule2", vec!["tag1"])]);
    /// assert_eq!(corpus.len(), 2);
    /// assert_eq!(corpus.tag_occurrences(), 3);
    /// ```
    pub fn from_pairs<I, N, T, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(name, tags)| TaggedEntity::new(name, tags.into_iter().map(Into::into).collect()))
            .collect()
    }

    /// Insert an entity, returning the tags it replaced if the name was
    /// already present.
    pub fn insert(&mut self, entity: TaggedEntity) -> Option<Vec<String>> {
        match self.index.get(&entity.name) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].tags, entity.tags)),
            None => {
                self.index.insert(entity.name.clone(), self.entries.len());
                self.entries.push(entity);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&slot| self.entries[slot].tags.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaggedEntity> {
        self.entries.iter()
    }

    pub fn entities(&self) -> &[TaggedEntity] {
        &self.entries
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of tag occurrences across every entity.
    pub fn tag_occurrences(&self) -> usize {
        self.entries.iter().map(|e| e.tags.len()).sum()
    }
}

impl FromIterator<TaggedEntity> for TagCorpus {
    fn from_iter<I: IntoIterator<Item = TaggedEntity>>(iter: I) -> Self {
        let mut corpus = TagCorpus::new();
        corpus.extend(iter);
        corpus
    }
}

impl Extend<TaggedEntity> for TagCorpus {
    fn extend<I: IntoIterator<Item = TaggedEntity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl<'a> IntoIterator for &'a TagCorpus {
    type Item = &'a TaggedEntity;
    type IntoIter = std::slice::Iter<'a, TaggedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for TagCorpus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entity in &self.entries {
            map.serialize_entry(&entity.name, &entity.tags)?;
        }
        map.end()
    }
}
