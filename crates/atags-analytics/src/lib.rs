//! # atags-analytics
//!
//! Turns a [`TagCorpus`](atags_parser::TagCorpus) into charts, spreadsheets
//! and per-rule listings.
//!
//! ## Architecture
//!
//! - **Chart kinds** ([`ChartKind`]): a closed set of chart types, each mapped
//!   to the aggregate shape it is drawn from.
//! - **Aggregation** ([`aggregate`]): frequency tables, proportional labels,
//!   weighted bipartite graphs, flow sequences and numeric series, all
//!   computed in a deterministic order without I/O.
//! - **Rendering** ([`render_chart`]): aggregate → ECharts option → one HTML
//!   document per chart.
//! - **Spreadsheet** ([`ExcelParams`]): one `Rule` / `Tag` row per tag
//!   occurrence, written as `.xlsx`.
//!
//! ## Quick Start
//!
//! ```rust
//! use atags_analytics::{Aggregate, ChartKind, aggregate};
//! use atags_parser::TagCorpus;
//!
//! let corpus = TagCorpus::from_pairs([("Rule1", vec!["tag1", "tag3"]), ("Rule2", vec!["tag1", "tag2"])]);
//! let Aggregate::Frequency(table) = aggregate(&corpus, ChartKind::Bar).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(table.get("tag1"), Some(2));
//! assert_eq!(table.total(), 4);
//! ```

pub mod aggregate;
pub mod chart;
pub mod error;
pub mod excel;
pub mod kind;
pub mod report;

pub use aggregate::{
    Aggregate, BipartiteGraph, FlowLink, FlowSequence, FrequencyTable, GraphEdge, GraphNode,
    NodeRole, NumericPoint, ProportionalLabel, TagCount, aggregate, aggregate_named,
};
pub use chart::{chart_option, generate_chart, render_chart};
pub use error::{AnalyticsError, Result};
pub use excel::{ExcelParams, spreadsheet_rows};
pub use kind::{ChartKind, NumericMode, Shape};
pub use report::RuleSummary;
