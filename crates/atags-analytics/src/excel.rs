//! Spreadsheet export: one `Rule` / `Tag` row per tag occurrence.

use std::path::{Path, PathBuf};

use atags_parser::TagCorpus;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::Result;

pub const HEADER: [&str; 2] = ["Rule", "Tag"];

/// Header row followed by one `[rule, tag]` row per tag occurrence, in
/// corpus order.
pub fn spreadsheet_rows(corpus: &TagCorpus) -> Vec<[String; 2]> {
    let mut rows = Vec::with_capacity(corpus.tag_occurrences() + 1);
    rows.push(HEADER.map(String::from));
    for entity in corpus {
        for tag in &entity.tags {
            rows.push([entity.name.clone(), tag.clone()]);
        }
    }
    rows
}

/// Where and under which sheet name the spreadsheet is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcelParams {
    pub sheet_name: String,
    pub output: PathBuf,
}

impl ExcelParams {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        ExcelParams {
            sheet_name: "Tags".to_string(),
            output: output.into(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Write the corpus to `self.output` as an `.xlsx` workbook.
    pub fn write(&self, corpus: &TagCorpus) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name)?;
        sheet.set_column_width(0, 40.0)?;
        sheet.set_column_width(1, 30.0)?;

        for (row, [rule, tag]) in spreadsheet_rows(corpus).iter().enumerate() {
            let row = row as u32;
            if row == 0 {
                sheet.write_string_with_format(row, 0, rule, &bold)?;
                sheet.write_string_with_format(row, 1, tag, &bold)?;
            } else {
                sheet.write_string(row, 0, rule)?;
                sheet.write_string(row, 1, tag)?;
            }
        }

        workbook.save(&self.output)?;
        log::debug!("wrote spreadsheet to {}", self.output.display());
        Ok(())
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}
