//! Run configuration built once from the parsed command line.

use std::path::PathBuf;

use atags_analytics::{AnalyticsError, ChartKind};
use atags_parser::SourceFormat;

/// Where rule bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A rule file or a directory walked recursively.
    Path(PathBuf),
    /// Base64 content, one blob per line.
    Content(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    pub format: SourceFormat,
    pub source: InputSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub json: bool,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    pub kinds: Vec<ChartKind>,
    pub output_dir: PathBuf,
    pub title: String,
}

impl ChartConfig {
    /// Parse the requested kinds, failing on the first unknown one or when
    /// only blank entries were given.
    pub fn new(kinds: &[String], output_dir: PathBuf, title: String) -> Result<Self, AnalyticsError> {
        let kinds = kinds
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.parse())
            .collect::<Result<Vec<ChartKind>, _>>()?;
        if kinds.is_empty() {
            return Err(AnalyticsError::NoKinds);
        }
        Ok(ChartConfig {
            kinds,
            output_dir,
            title,
        })
    }

    /// Output path of the `index`-th requested kind (0-based).
    pub fn output_path(&self, index: usize, kind: ChartKind) -> PathBuf {
        self.output_dir.join(format!("{:02}-{kind}.html", index + 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub output_dir: PathBuf,
    pub file_name: String,
    pub sheet_name: String,
}

impl SheetConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}
