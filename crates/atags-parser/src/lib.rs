//! # atags-parser
//!
//! Rule ingestion for atags. Detection rules in several formats are reduced
//! to the only two things tag analysis cares about: a rule name and its tags.
//!
//! - **Sigma**: one YAML rule per input (`title`, `tags`)
//! - **YARA**: any number of rules per input, parsed with `yara-x-parser`
//!   (identifier, tags)
//! - **CSIEM**: one JSON rule per input (`Name`, `Tags`)
//!
//! Inputs come from a file, a directory walked recursively, or inline base64
//! content. Batch ingestion tolerates bad inputs: each failure is logged and
//! recorded, and the rest of the batch is still decoded.
//!
//! ## Quick Start
//!
//! ```rust
//! use atags_parser::{SourceFormat, ingest, load_base64};
//!
//! let inputs = load_base64("dGl0bGU6IFIxCnRhZ3M6IFthLCBiXQo=");
//! let ingested = ingest(inputs, SourceFormat::Sigma);
//!
//! assert_eq!(ingested.corpus.get("R1").unwrap(), ["a", "b"]);
//! ```

pub mod ast;
pub mod csiem;
pub mod error;
pub mod ingest;
pub mod sigma;
pub mod source;
pub mod yara;

pub use ast::{SourceFormat, TagCorpus, TaggedEntity};
pub use csiem::parse_csiem_rule;
pub use error::{ParseError, Result};
pub use ingest::{Ingested, ingest, parse_rules};
pub use sigma::parse_sigma_rule;
pub use source::{InputBlob, Inputs, SkippedInput, load_base64, load_path};
pub use yara::parse_yara_rules;
