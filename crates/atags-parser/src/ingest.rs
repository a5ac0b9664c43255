//! Batch ingestion: decode every loaded blob and fold the results into one
//! [`TagCorpus`].

use crate::ast::{SourceFormat, TagCorpus, TaggedEntity};
use crate::csiem::parse_csiem_rule;
use crate::error::Result;
use crate::sigma::parse_sigma_rule;
use crate::source::{Inputs, SkippedInput};
use crate::yara::parse_yara_rules;

/// Decode one blob in the given format.
pub fn parse_rules(input: &[u8], format: SourceFormat) -> Result<Vec<TaggedEntity>> {
    match format {
        SourceFormat::Sigma => parse_sigma_rule(input).map(|entity| vec![entity]),
        SourceFormat::Yara => parse_yara_rules(input),
        SourceFormat::Csiem => parse_csiem_rule(input).map(|entity| vec![entity]),
    }
}

/// Outcome of a batch ingestion.
#[derive(Debug, Default)]
pub struct Ingested {
    pub corpus: TagCorpus,
    /// Inputs that failed to load or decode, in the order they were seen.
    pub skipped: Vec<SkippedInput>,
    /// Number of blobs that decoded successfully.
    pub decoded: usize,
    /// Number of entities that overwrote an earlier entity of the same name.
    pub replaced: usize,
}

/// Decode every blob independently. A failing blob is logged and recorded
/// in [`Ingested::skipped`]; the remaining blobs are still processed.
pub fn ingest(inputs: Inputs, format: SourceFormat) -> Ingested {
    let mut ingested = Ingested {
        skipped: inputs.skipped,
        ..Default::default()
    };

    for blob in inputs.blobs {
        match parse_rules(&blob.bytes, format) {
            Ok(entities) => {
                ingested.decoded += 1;
                log::debug!("{}: {} {format} rule(s)", blob.origin, entities.len());
                for entity in entities {
                    let name = entity.name.clone();
                    if ingested.corpus.insert(entity).is_some() {
                        ingested.replaced += 1;
                        log::debug!("{}: rule '{name}' replaces an earlier rule", blob.origin);
                    }
                }
            }
            Err(error) => {
                log::warn!("skipping {}: {error}", blob.origin);
                ingested.skipped.push(SkippedInput {
                    origin: blob.origin,
                    error,
                });
            }
        }
    }

    ingested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InputBlob;

    fn blob(origin: &str, text: &str) -> InputBlob {
        InputBlob {
            origin: origin.into(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn bad_blob_does_not_stop_batch() {
        let inputs = Inputs {
            blobs: vec![
                blob("one.yml", "title: R1\ntags: [a]\n"),
                blob("bad.yml", "title: [oops\n"),
                blob("two.yml", "title: R2\ntags: [b, c]\n"),
            ],
            skipped: Vec::new(),
        };

        let ingested = ingest(inputs, SourceFormat::Sigma);
        assert_eq!(ingested.decoded, 2);
        assert_eq!(ingested.corpus.len(), 2);
        assert_eq!(ingested.corpus.tag_occurrences(), 3);
        assert_eq!(ingested.skipped.len(), 1);
        assert_eq!(ingested.skipped[0].origin, "bad.yml");
    }

    #[test]
    fn duplicate_titles_last_write_wins() {
        let inputs = Inputs {
            blobs: vec![
                blob("a.yml", "title: Same\ntags: [first]\n"),
                blob("b.yml", "title: Other\n"),
                blob("c.yml", "title: Same\ntags: [second]\n"),
            ],
            skipped: Vec::new(),
        };

        let ingested = ingest(inputs, SourceFormat::Sigma);
        assert_eq!(ingested.replaced, 1);
        assert_eq!(ingested.corpus.get("Same").unwrap(), ["second"]);
        assert_eq!(ingested.corpus.entities()[0].name, "Same");
    }

    #[test]
    fn csiem_dispatch() {
        let entities = parse_rules(br#"{"Name": "N", "Tags": ["t"]}"#, SourceFormat::Csiem).unwrap();
        assert_eq!(entities, [TaggedEntity::new("N", vec!["t".into()])]);
    }
}
