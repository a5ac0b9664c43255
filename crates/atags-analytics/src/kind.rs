//! Chart kinds and the aggregate shape each one draws.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AnalyticsError;

/// A chart the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Area,
    Histogram,
    Boxplot,
    Radar,
    Pie,
    Doughnut,
    Gauge,
    Funnel,
    Wordcloud,
    Treemap,
    Heatmap,
    Graph,
    Tree,
    Sankey,
}

/// How tag strings are turned into numbers for the numeric-dependent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericMode {
    /// One point per entity: the sum of its tags parsed as floats.
    SumPerEntity,
    /// One point per tag occurrence, named after the entity, parsed as float.
    PerTag,
    /// Like `PerTag`, but every tag must be an integer.
    PerTagInteger,
}

/// Aggregate shape a chart kind is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Frequency,
    Proportional,
    Bipartite,
    Flow,
    Numeric(NumericMode),
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Frequency => "frequency",
            Shape::Proportional => "proportional",
            Shape::Bipartite => "bipartite",
            Shape::Flow => "flow",
            Shape::Numeric(_) => "numeric",
        }
    }
}

impl ChartKind {
    pub const ALL: [ChartKind; 17] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::Histogram,
        ChartKind::Boxplot,
        ChartKind::Radar,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Gauge,
        ChartKind::Funnel,
        ChartKind::Wordcloud,
        ChartKind::Treemap,
        ChartKind::Heatmap,
        ChartKind::Graph,
        ChartKind::Tree,
        ChartKind::Sankey,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::Histogram => "histogram",
            ChartKind::Boxplot => "boxplot",
            ChartKind::Radar => "radar",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Gauge => "gauge",
            ChartKind::Funnel => "funnel",
            ChartKind::Wordcloud => "wordcloud",
            ChartKind::Treemap => "treemap",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Graph => "graph",
            ChartKind::Tree => "tree",
            ChartKind::Sankey => "sankey",
        }
    }

    /// The aggregate this kind is drawn from.
    pub fn shape(self) -> Shape {
        match self {
            ChartKind::Bar
            | ChartKind::Line
            | ChartKind::Scatter
            | ChartKind::Area
            | ChartKind::Histogram
            | ChartKind::Boxplot
            | ChartKind::Radar => Shape::Frequency,
            ChartKind::Pie => Shape::Proportional,
            ChartKind::Doughnut | ChartKind::Gauge | ChartKind::Funnel => {
                Shape::Numeric(NumericMode::SumPerEntity)
            }
            ChartKind::Wordcloud => Shape::Numeric(NumericMode::PerTag),
            ChartKind::Treemap => Shape::Numeric(NumericMode::PerTagInteger),
            ChartKind::Heatmap | ChartKind::Graph | ChartKind::Tree => Shape::Bipartite,
            ChartKind::Sankey => Shape::Flow,
        }
    }

    /// Whether rendering this kind requires every tag to parse as a number.
    pub fn is_numeric(self) -> bool {
        matches!(self.shape(), Shape::Numeric(_))
    }
}

impl FromStr for ChartKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| AnalyticsError::UnsupportedKind(s.to_string()))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.name().parse::<ChartKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(" Pie ".parse::<ChartKind>().unwrap(), ChartKind::Pie);
        assert_eq!("WORDCLOUD".parse::<ChartKind>().unwrap(), ChartKind::Wordcloud);
    }

    #[test]
    fn unknown_kind_names_the_value() {
        let err = "unsupported-kind".parse::<ChartKind>().unwrap_err();
        assert!(
            matches!(err, AnalyticsError::UnsupportedKind(ref k) if k == "unsupported-kind"),
            "got: {err}"
        );
        assert_eq!(err.to_string(), "unsupported chart kind 'unsupported-kind'");
    }

    #[test]
    fn numeric_kinds() {
        let numeric: Vec<ChartKind> = ChartKind::ALL.into_iter().filter(|k| k.is_numeric()).collect();
        assert_eq!(
            numeric,
            [
                ChartKind::Doughnut,
                ChartKind::Gauge,
                ChartKind::Funnel,
                ChartKind::Wordcloud,
                ChartKind::Treemap
            ]
        );
    }
}
