mod config;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use atags_analytics::{ChartKind, ExcelParams, RuleSummary, generate_chart};
use atags_parser::{Ingested, SourceFormat, ingest, load_base64, load_path};
use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::config::{ChartConfig, InputConfig, InputSource, ListConfig, SheetConfig};

#[derive(Parser)]
#[command(name = "atags")]
#[command(about = "Chart, export and list the tags of Sigma, YARA and CSIEM rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Rule format and input source shared by every subcommand.
#[derive(Args)]
#[command(group(ArgGroup::new("format").required(true).args(["sigma", "yara", "csiem"])))]
#[command(group(ArgGroup::new("source").required(true).args(["path", "content"])))]
struct InputArgs {
    /// Read Sigma rules (YAML, one rule per file)
    #[arg(long)]
    sigma: bool,

    /// Read YARA rule sets
    #[arg(long)]
    yara: bool,

    /// Read CSIEM rules (JSON, one rule per file)
    #[arg(long)]
    csiem: bool,

    /// Rule file, or directory of rule files (walked recursively)
    #[arg(short = 'p', long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Base64-encoded rule content; give several rules one per line
    #[arg(short = 'c', long, value_name = "BASE64")]
    content: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the name and tags of every rule
    List {
        #[command(flatten)]
        input: InputArgs,

        /// Print JSON objects with `Name` and `Tags` keys
        #[arg(long)]
        json: bool,

        /// Write one file per rule into this directory instead of printing
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Render tag charts as HTML documents
    ///
    /// One document is written per requested kind, named after its
    /// position and kind (e.g. `01-bar.html`).
    Chart {
        #[command(flatten)]
        input: InputArgs,

        /// Chart kinds to render, comma separated (see `atags kinds`)
        #[arg(short, long, value_delimiter = ',', required = true)]
        kinds: Vec<String>,

        /// Output directory (created if missing)
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Chart title
        #[arg(short, long, default_value = "Rule Tags")]
        title: String,
    },

    /// Export a Rule/Tag spreadsheet (.xlsx)
    Sheet {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory (created if missing)
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Spreadsheet file name
        #[arg(long, default_value = "tags.xlsx")]
        file_name: String,

        /// Worksheet name
        #[arg(long, default_value = "Tags")]
        sheet_name: String,
    },

    /// List the supported chart kinds
    Kinds,
}

impl InputArgs {
    fn into_config(self) -> InputConfig {
        let format = if self.yara {
            SourceFormat::Yara
        } else if self.csiem {
            SourceFormat::Csiem
        } else {
            SourceFormat::Sigma
        };
        let source = match (self.path, self.content) {
            (Some(path), _) => InputSource::Path(path),
            (None, content) => InputSource::Content(content.unwrap_or_default()),
        };
        InputConfig { format, source }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List {
            input,
            json,
            output,
        } => cmd_list(
            &input.into_config(),
            &ListConfig {
                json,
                output_dir: output,
            },
        ),
        Commands::Chart {
            input,
            kinds,
            output,
            title,
        } => {
            let chart = match ChartConfig::new(&kinds, output, title) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {e}");
                    process::exit(1);
                }
            };
            cmd_chart(&input.into_config(), &chart)
        }
        Commands::Sheet {
            input,
            output,
            file_name,
            sheet_name,
        } => cmd_sheet(
            &input.into_config(),
            &SheetConfig {
                output_dir: output,
                file_name,
                sheet_name,
            },
        ),
        Commands::Kinds => cmd_kinds(),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_list(input: &InputConfig, list: &ListConfig) {
    let ingested = load_corpus(input);

    if let Some(dir) = &list.output_dir {
        ensure_dir(dir);
    }

    let mut failed = false;
    let mut used_stems = HashSet::new();
    for entity in &ingested.corpus {
        let summary = RuleSummary::new(entity);
        let text = if list.json {
            match serde_json::to_string_pretty(&summary) {
                Ok(j) => j,
                Err(e) => {
                    eprintln!("Error encoding JSON for rule '{}': {e}", summary.name);
                    failed = true;
                    continue;
                }
            }
        } else {
            summary.to_text()
        };

        match &list.output_dir {
            Some(dir) => {
                let extension = if list.json { "json" } else { "txt" };
                let stem = unique_stem(summary.file_stem(), &mut used_stems);
                let path = dir.join(format!("{stem}.{extension}"));
                match fs::write(&path, text) {
                    Ok(()) => println!(
                        "Output for rule '{}' written to file: {}",
                        summary.name,
                        path.display()
                    ),
                    Err(e) => {
                        eprintln!("Error writing {}: {e}", path.display());
                        failed = true;
                    }
                }
            }
            None => println!("{text}"),
        }
    }

    if failed {
        process::exit(1);
    }
}

fn cmd_chart(input: &InputConfig, chart: &ChartConfig) {
    let ingested = load_corpus(input);
    ensure_dir(&chart.output_dir);

    let mut failed = 0usize;
    for (index, &kind) in chart.kinds.iter().enumerate() {
        let path = chart.output_path(index, kind);
        match generate_chart(&ingested.corpus, kind, &chart.title, &path) {
            Ok(()) => println!("Wrote {kind} chart to {}", path.display()),
            Err(e) => {
                eprintln!("Error rendering {kind} chart: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} chart(s) failed", chart.kinds.len());
        process::exit(1);
    }
}

fn cmd_sheet(input: &InputConfig, sheet: &SheetConfig) {
    let ingested = load_corpus(input);
    ensure_dir(&sheet.output_dir);

    let params = ExcelParams::new(sheet.output_path()).with_sheet_name(&sheet.sheet_name);
    match params.write(&ingested.corpus) {
        Ok(()) => println!(
            "Wrote {} rows to {}",
            ingested.corpus.tag_occurrences() + 1,
            params.output().display()
        ),
        Err(e) => {
            eprintln!("Error writing spreadsheet {}: {e}", params.output().display());
            process::exit(1);
        }
    }
}

fn cmd_kinds() {
    for kind in ChartKind::ALL {
        let note = if kind.is_numeric() { "  (numeric tags)" } else { "" };
        println!("{kind}{note}");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_corpus(input: &InputConfig) -> Ingested {
    let (inputs, origin) = match &input.source {
        InputSource::Path(path) => match load_path(path) {
            Ok(inputs) => (inputs, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading input: {e}");
                process::exit(1);
            }
        },
        InputSource::Content(content) => (load_base64(content), "inline content".to_string()),
    };
    let total_inputs = inputs.blobs.len() + inputs.skipped.len();

    let ingested = ingest(inputs, input.format);
    for skipped in &ingested.skipped {
        eprintln!("Skipped {}: {}", skipped.origin, skipped.error);
    }
    if ingested.replaced > 0 {
        eprintln!(
            "Warning: {} rule(s) replaced an earlier rule with the same name",
            ingested.replaced
        );
    }

    log::info!("Read {} {} input(s) from {origin}", total_inputs, input.format);
    eprintln!(
        "Loaded {} rules ({} tags) from {total_inputs} inputs, {} skipped",
        ingested.corpus.len(),
        ingested.corpus.tag_occurrences(),
        ingested.skipped.len(),
    );

    ingested
}

/// Claim `stem` for one listing file, appending `-2`, `-3`, ... when an
/// earlier rule name already sanitised to the same stem.
fn unique_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.to_lowercase()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}");
        if used.insert(candidate.to_lowercase()) {
            eprintln!("Warning: listing file name '{stem}' is already taken, using '{candidate}'");
            return candidate;
        }
        n += 1;
    }
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Error creating output directory {}: {e}", dir.display());
        process::exit(1);
    }
}
